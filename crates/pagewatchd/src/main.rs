// # pagewatchd - Page Change Monitor Daemon
//
// This daemon is a THIN integration layer: all change-detection logic lives
// in pagewatch-core.
//
// The pagewatchd daemon is responsible for:
// 1. Reading configuration from environment variables (and an optional .env)
// 2. Initializing logging and the runtime
// 3. Building the HTTP fetcher and the SMTP notifier
// 4. Running the monitor until SIGTERM/SIGINT
//
// ## Configuration
//
// ### Target
// - `PAGEWATCH_TARGET_URL` (required): URL of the watched page
// - `PAGEWATCH_INTERVAL_MS` (required): Poll interval in milliseconds
// - `PAGEWATCH_START_MARKER`: Start of the watched region
// - `PAGEWATCH_END_MARKER`: End of the watched region
// - `PAGEWATCH_USER_AGENT`: User-Agent header for requests
// - `PAGEWATCH_FETCH_TIMEOUT_SECS`: Request timeout (default: 30)
//
// ### Email
// - `PAGEWATCH_RECIPIENT_EMAIL` (required): Where notifications go
// - `PAGEWATCH_SMTP_HOST` (required): SMTP server
// - `PAGEWATCH_SMTP_PORT`: SMTP port (default: 587)
// - `PAGEWATCH_SMTP_USER` (required): SMTP username
// - `PAGEWATCH_SMTP_PASS` (required): SMTP password
// - `PAGEWATCH_SMTP_SECURE`: Implicit TLS instead of STARTTLS (default: false)
// - `PAGEWATCH_SMTP_TIMEOUT_SECS`: SMTP timeout (default: 30)
// - `PAGEWATCH_SENDER_EMAIL` (required): From address
// - `PAGEWATCH_SENDER_NAME`: From display name (default: "Website Monitor")
// - `PAGEWATCH_DRY_RUN`: Log emails instead of sending them (default: false)
//
// ### Logging
// - `PAGEWATCH_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Migrating an existing .env
//
// Older deployments used unprefixed names. They are NOT read; rename them:
//
// | Old name            | New name                    |
// |---------------------|-----------------------------|
// | `TARGET_URL`        | `PAGEWATCH_TARGET_URL`      |
// | `CHECK_INTERVAL_MS` | `PAGEWATCH_INTERVAL_MS`     |
// | `RECIPIENT_EMAIL`   | `PAGEWATCH_RECIPIENT_EMAIL` |
// | `SMTP_HOST`         | `PAGEWATCH_SMTP_HOST`       |
// | `SMTP_PORT`         | `PAGEWATCH_SMTP_PORT`       |
// | `SMTP_SECURE`       | `PAGEWATCH_SMTP_SECURE`     |
// | `SMTP_USER`         | `PAGEWATCH_SMTP_USER`       |
// | `SMTP_PASS`         | `PAGEWATCH_SMTP_PASS`       |
// | `SENDER_EMAIL`      | `PAGEWATCH_SENDER_EMAIL`    |
// | `SENDER_NAME`       | `PAGEWATCH_SENDER_NAME`     |
//
// ## Example
//
// ```bash
// export PAGEWATCH_TARGET_URL=https://example.com/notices
// export PAGEWATCH_INTERVAL_MS=300000
// export PAGEWATCH_RECIPIENT_EMAIL=me@example.com
// export PAGEWATCH_SMTP_HOST=smtp.example.com
// export PAGEWATCH_SMTP_USER=monitor@example.com
// export PAGEWATCH_SMTP_PASS=app-password
// export PAGEWATCH_SENDER_EMAIL=monitor@example.com
//
// pagewatchd
// ```

use anyhow::Result;
use pagewatch_core::{Markers, Monitor, MonitorConfig, MonitorEvent};
use pagewatch_fetch_http::{HttpFetcher, HttpFetcherConfig};
use pagewatch_notify_smtp::{SmtpConfig, SmtpNotifier};
use std::env;
use std::fmt;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PagewatchExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<PagewatchExitCode> for ExitCode {
    fn from(code: PagewatchExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Variables that must be set for the daemon to start
const REQUIRED_VARS: &[&str] = &[
    "PAGEWATCH_TARGET_URL",
    "PAGEWATCH_INTERVAL_MS",
    "PAGEWATCH_RECIPIENT_EMAIL",
    "PAGEWATCH_SMTP_HOST",
    "PAGEWATCH_SMTP_USER",
    "PAGEWATCH_SMTP_PASS",
    "PAGEWATCH_SENDER_EMAIL",
];

/// Application configuration
struct Config {
    target_url: String,
    interval_ms: u64,
    start_marker: Option<String>,
    end_marker: Option<String>,
    user_agent: Option<String>,
    fetch_timeout_secs: u64,
    recipient_email: String,
    smtp_host: String,
    smtp_port: u16,
    smtp_user: String,
    smtp_pass: String,
    smtp_secure: bool,
    smtp_timeout_secs: u64,
    sender_email: String,
    sender_name: String,
    dry_run: bool,
    log_level: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("target_url", &self.target_url)
            .field("interval_ms", &self.interval_ms)
            .field("recipient_email", &self.recipient_email)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_pass", &"<REDACTED>")
            .field("smtp_secure", &self.smtp_secure)
            .field("sender_email", &self.sender_email)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|name| var(name).is_none())
            .collect();
        if !missing.is_empty() {
            anyhow::bail!(
                "Missing required environment variables: {}",
                missing.join(", ")
            );
        }

        let required = |name: &str| var(name).unwrap_or_default();

        Ok(Self {
            target_url: required("PAGEWATCH_TARGET_URL").trim().to_string(),
            interval_ms: parse_number(&var, "PAGEWATCH_INTERVAL_MS", 0)?,
            start_marker: lookup("PAGEWATCH_START_MARKER"),
            end_marker: lookup("PAGEWATCH_END_MARKER"),
            user_agent: var("PAGEWATCH_USER_AGENT"),
            fetch_timeout_secs: parse_number(&var, "PAGEWATCH_FETCH_TIMEOUT_SECS", 30)?,
            recipient_email: required("PAGEWATCH_RECIPIENT_EMAIL").trim().to_string(),
            smtp_host: required("PAGEWATCH_SMTP_HOST").trim().to_string(),
            smtp_port: parse_number(&var, "PAGEWATCH_SMTP_PORT", 587)?,
            smtp_user: required("PAGEWATCH_SMTP_USER"),
            smtp_pass: required("PAGEWATCH_SMTP_PASS"),
            smtp_secure: parse_flag(&var, "PAGEWATCH_SMTP_SECURE")?,
            smtp_timeout_secs: parse_number(&var, "PAGEWATCH_SMTP_TIMEOUT_SECS", 30)?,
            sender_email: required("PAGEWATCH_SENDER_EMAIL").trim().to_string(),
            sender_name: var("PAGEWATCH_SENDER_NAME")
                .unwrap_or_else(|| pagewatch_notify_smtp::DEFAULT_FROM_NAME.to_string()),
            dry_run: parse_flag(&var, "PAGEWATCH_DRY_RUN")?,
            log_level: var("PAGEWATCH_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// This performs validation including:
    /// - URL scheme
    /// - Numeric ranges
    /// - Email address format
    /// - Marker and log level values
    fn validate(&self) -> Result<()> {
        if !self.target_url.starts_with("https://") && !self.target_url.starts_with("http://") {
            anyhow::bail!(
                "PAGEWATCH_TARGET_URL must use HTTP or HTTPS scheme. Got: {}",
                self.target_url
            );
        }

        if self.target_url.starts_with("http://") {
            eprintln!(
                "WARNING: PAGEWATCH_TARGET_URL uses HTTP (not HTTPS). \
                 Content could be altered in transit."
            );
        }

        if self.interval_ms == 0 {
            anyhow::bail!("PAGEWATCH_INTERVAL_MS must be greater than 0");
        }

        if self.fetch_timeout_secs == 0 {
            anyhow::bail!("PAGEWATCH_FETCH_TIMEOUT_SECS must be greater than 0");
        }

        if self.smtp_timeout_secs == 0 {
            anyhow::bail!("PAGEWATCH_SMTP_TIMEOUT_SECS must be greater than 0");
        }

        if self.smtp_port == 0 {
            anyhow::bail!("PAGEWATCH_SMTP_PORT must be greater than 0");
        }

        if !pagewatch_notify_smtp::is_valid_email(&self.recipient_email) {
            anyhow::bail!(
                "PAGEWATCH_RECIPIENT_EMAIL is not a valid email address: {}",
                self.recipient_email
            );
        }

        if !pagewatch_notify_smtp::is_valid_email(&self.sender_email) {
            anyhow::bail!(
                "PAGEWATCH_SENDER_EMAIL is not a valid email address: {}",
                self.sender_email
            );
        }

        for (name, marker) in [
            ("PAGEWATCH_START_MARKER", &self.start_marker),
            ("PAGEWATCH_END_MARKER", &self.end_marker),
        ] {
            if marker.as_deref() == Some("") {
                anyhow::bail!("{} cannot be empty when set", name);
            }
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "PAGEWATCH_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    fn monitor_config(&self) -> MonitorConfig {
        let defaults = Markers::default();
        let markers = Markers::new(
            self.start_marker.clone().unwrap_or(defaults.start),
            self.end_marker.clone().unwrap_or(defaults.end),
        );

        MonitorConfig::new(
            self.target_url.clone(),
            Duration::from_millis(self.interval_ms),
        )
        .with_markers(markers)
    }

    fn fetcher_config(&self) -> HttpFetcherConfig {
        let mut config = HttpFetcherConfig {
            timeout_secs: self.fetch_timeout_secs,
            ..HttpFetcherConfig::default()
        };
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        config
    }

    fn smtp_config(&self) -> SmtpConfig {
        SmtpConfig {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            username: self.smtp_user.clone(),
            password: self.smtp_pass.clone(),
            secure: self.smtp_secure,
            from_address: self.sender_email.clone(),
            from_name: self.sender_name.clone(),
            recipient: self.recipient_email.clone(),
            timeout_secs: self.smtp_timeout_secs,
            dry_run: self.dry_run,
        }
    }

    fn tracing_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

/// Parse an optional numeric variable, falling back to `default` when unset
fn parse_number<T, F>(var: &F, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} must be a valid number. Got '{}': {}", name, value, e)),
        None => Ok(default),
    }
}

/// Parse an optional boolean flag (unset means false)
fn parse_flag<F>(var: &F, name: &str) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match var(name).map(|v| v.trim().to_lowercase()) {
        None => Ok(false),
        Some(v) if matches!(v.as_str(), "true" | "1" | "yes") => Ok(true),
        Some(v) if matches!(v.as_str(), "false" | "0" | "no") => Ok(false),
        Some(v) => anyhow::bail!("{} must be true or false. Got: {}", name, v),
    }
}

fn main() -> ExitCode {
    // A missing .env file is not an error
    let dotenv_path = dotenvy::dotenv().ok();

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return PagewatchExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return PagewatchExitCode::ConfigError.into();
    }

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.tracing_level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return PagewatchExitCode::ConfigError.into();
    }

    info!("Starting pagewatchd daemon");
    if let Some(path) = dotenv_path {
        debug!("Loaded environment from {}", path.display());
    }
    debug!(config = ?config, "Configuration loaded");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return PagewatchExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(config)).into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> PagewatchExitCode {
    let monitor_config = config.monitor_config();
    match serde_json::to_string(&monitor_config) {
        Ok(json) => debug!(monitor = %json, "Monitor configuration"),
        Err(e) => debug!("Monitor configuration not serializable: {}", e),
    }

    let fetcher = match HttpFetcher::new(&config.fetcher_config()) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            error!("Failed to create HTTP fetcher: {}", e);
            return PagewatchExitCode::ConfigError;
        }
    };

    let notifier = match SmtpNotifier::new(config.smtp_config()) {
        Ok(notifier) => notifier,
        Err(e) => {
            error!("Failed to create SMTP notifier: {}", e);
            return PagewatchExitCode::ConfigError;
        }
    };

    let (mut monitor, event_rx) =
        match Monitor::new(Box::new(fetcher), Box::new(notifier), monitor_config) {
            Ok(parts) => parts,
            Err(e) => {
                error!("Failed to create monitor: {}", e);
                return PagewatchExitCode::ConfigError;
            }
        };

    tokio::spawn(log_events(event_rx));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let signals = tokio::spawn(async move {
        let received = wait_for_shutdown().await;
        let _ = shutdown_tx.send(());
        received
    });

    // Recoverable failures never end the run; only a shutdown request does.
    monitor.run_with_shutdown(Some(shutdown_rx)).await;

    shutdown_exit_code(signals.await)
}

/// Map the outcome of the signal listener to an exit code
///
/// Without working signal handlers the daemon cannot be stopped cleanly, so
/// that is reported as a runtime error.
fn shutdown_exit_code(
    outcome: std::result::Result<Result<&'static str>, tokio::task::JoinError>,
) -> PagewatchExitCode {
    match outcome {
        Ok(Ok(signal)) => {
            info!("Received shutdown signal: {}", signal);
            info!("Shutting down daemon");
            PagewatchExitCode::CleanShutdown
        }
        Ok(Err(e)) => {
            error!("Shutdown handler error: {}", e);
            PagewatchExitCode::RuntimeError
        }
        Err(e) => {
            error!("Signal task failed: {}", e);
            PagewatchExitCode::RuntimeError
        }
    }
}

/// Forward monitor events to the debug log
async fn log_events(mut event_rx: mpsc::Receiver<MonitorEvent>) {
    while let Some(event) = event_rx.recv().await {
        debug!(event = ?event, "Monitor event");
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(signal)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("PAGEWATCH_TARGET_URL", "https://example.com/notices"),
            ("PAGEWATCH_INTERVAL_MS", "300000"),
            ("PAGEWATCH_RECIPIENT_EMAIL", "me@example.com"),
            ("PAGEWATCH_SMTP_HOST", "smtp.example.com"),
            ("PAGEWATCH_SMTP_USER", "monitor@example.com"),
            ("PAGEWATCH_SMTP_PASS", "app-password"),
            ("PAGEWATCH_SENDER_EMAIL", "monitor@example.com"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<Config> {
        Config::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn test_minimal_config_loads_with_defaults() {
        let config = load(&base_vars()).unwrap();
        config.validate().unwrap();

        assert_eq!(config.smtp_port, 587);
        assert!(!config.smtp_secure);
        assert!(!config.dry_run);
        assert_eq!(config.sender_name, "Website Monitor");
        assert_eq!(config.fetch_timeout_secs, 30);
        assert_eq!(config.tracing_level(), Level::INFO);

        let monitor = config.monitor_config();
        assert!(monitor.validate().is_ok());
        assert_eq!(monitor.interval(), Duration::from_secs(300));
        assert_eq!(monitor.markers, Markers::default());
    }

    #[test]
    fn test_missing_required_vars_are_listed() {
        let mut vars = base_vars();
        vars.remove("PAGEWATCH_SMTP_PASS");
        vars.insert("PAGEWATCH_TARGET_URL", "   ");

        let err = load(&vars).err().expect("missing vars must be rejected");
        let message = err.to_string();
        assert!(message.contains("PAGEWATCH_SMTP_PASS"));
        assert!(message.contains("PAGEWATCH_TARGET_URL"));
    }

    #[test]
    fn test_malformed_interval_is_rejected() {
        let mut vars = base_vars();
        vars.insert("PAGEWATCH_INTERVAL_MS", "five minutes");
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_zero_interval_fails_validation() {
        let mut vars = base_vars();
        vars.insert("PAGEWATCH_INTERVAL_MS", "0");
        let config = load(&vars).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_scheme_fails_validation() {
        let mut vars = base_vars();
        vars.insert("PAGEWATCH_TARGET_URL", "file:///etc/passwd");
        assert!(load(&vars).unwrap().validate().is_err());
    }

    #[test]
    fn test_invalid_recipient_fails_validation() {
        let mut vars = base_vars();
        vars.insert("PAGEWATCH_RECIPIENT_EMAIL", "not-an-email");
        assert!(load(&vars).unwrap().validate().is_err());
    }

    #[test]
    fn test_flags_and_overrides() {
        let mut vars = base_vars();
        vars.insert("PAGEWATCH_SMTP_SECURE", "true");
        vars.insert("PAGEWATCH_SMTP_PORT", "465");
        vars.insert("PAGEWATCH_DRY_RUN", "1");
        vars.insert("PAGEWATCH_START_MARKER", "<main>");
        vars.insert("PAGEWATCH_END_MARKER", "</main>");
        vars.insert("PAGEWATCH_USER_AGENT", "pagewatch/0.1");
        vars.insert("PAGEWATCH_LOG_LEVEL", "DEBUG");

        let config = load(&vars).unwrap();
        config.validate().unwrap();

        let smtp = config.smtp_config();
        assert!(smtp.secure);
        assert!(smtp.dry_run);
        assert_eq!(smtp.port, 465);
        assert_eq!(config.fetcher_config().user_agent, "pagewatch/0.1");
        assert_eq!(config.monitor_config().markers, Markers::new("<main>", "</main>"));
        assert_eq!(config.tracing_level(), Level::DEBUG);
    }

    #[test]
    fn test_bad_flag_is_rejected() {
        let mut vars = base_vars();
        vars.insert("PAGEWATCH_SMTP_SECURE", "maybe");
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_empty_marker_fails_validation() {
        let mut vars = base_vars();
        vars.insert("PAGEWATCH_END_MARKER", "");
        assert!(load(&vars).unwrap().validate().is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = load(&base_vars()).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("app-password"));
    }

    #[tokio::test]
    async fn test_shutdown_exit_code() {
        let clean = tokio::spawn(async { Ok::<_, anyhow::Error>("SIGTERM") }).await;
        assert_eq!(shutdown_exit_code(clean), PagewatchExitCode::CleanShutdown);

        let broken = tokio::spawn(async {
            Err::<&'static str, _>(anyhow::anyhow!("Failed to setup SIGTERM handler"))
        })
        .await;
        assert_eq!(shutdown_exit_code(broken), PagewatchExitCode::RuntimeError);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(PagewatchExitCode::CleanShutdown as u8, 0);
        assert_eq!(PagewatchExitCode::ConfigError as u8, 1);
        assert_eq!(PagewatchExitCode::RuntimeError as u8, 2);
    }
}
