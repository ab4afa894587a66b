// # SMTP Notifier
//
// This crate provides an email notifier for the pagewatch monitor.
//
// ## Behavior
//
// - One message per `notify()` call, sent to a single recipient
// - Multipart/alternative: plain-text body plus its HTML rendering
// - `secure = true` connects with implicit TLS, otherwise STARTTLS
// - Bounded by a transport timeout
// - No retries: a failed delivery is reported to the monitor and dropped
//
// ## Security Requirements
//
// - The SMTP password NEVER appears in logs or `Debug` output
// - The password is provided by the embedding application (environment)

use lettre::message::{Mailbox, MultiPart, SinglePart, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use pagewatch_core::traits::Notifier;
use pagewatch_core::{Error, Notification, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default sender display name
pub const DEFAULT_FROM_NAME: &str = "Website Monitor";

/// SMTP notifier configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// SMTP server hostname
    pub host: String,

    /// SMTP server port. Common values: 465 (TLS), 587 (STARTTLS)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Username for SMTP authentication
    pub username: String,

    /// Password for SMTP authentication
    #[serde(skip_serializing)]
    pub password: String,

    /// Use implicit TLS instead of STARTTLS
    #[serde(default)]
    pub secure: bool,

    /// Sender email address
    pub from_address: String,

    /// Sender display name
    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Recipient email address
    pub recipient: String,

    /// Connection and command timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Log messages instead of sending them
    #[serde(default)]
    pub dry_run: bool,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("secure", &self.secure)
            .field("from_address", &self.from_address)
            .field("from_name", &self.from_name)
            .field("recipient", &self.recipient)
            .field("timeout_secs", &self.timeout_secs)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl SmtpConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::config("SMTP host cannot be empty"));
        }
        if self.port == 0 {
            return Err(Error::config("SMTP port must be > 0"));
        }
        if self.username.is_empty() {
            return Err(Error::config("SMTP username cannot be empty"));
        }
        if self.password.is_empty() {
            return Err(Error::config("SMTP password cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(Error::config("SMTP timeout must be > 0"));
        }
        parse_address(&self.from_address, "sender")?;
        parse_address(&self.recipient, "recipient")?;
        Ok(())
    }
}

fn default_port() -> u16 {
    587
}

fn default_from_name() -> String {
    DEFAULT_FROM_NAME.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn parse_address(address: &str, role: &str) -> Result<Address> {
    address
        .parse::<Address>()
        .map_err(|e| Error::config(format!("Invalid {} address '{}': {}", role, address, e)))
}

/// Check whether a string is a syntactically valid email address
pub fn is_valid_email(address: &str) -> bool {
    address.parse::<Address>().is_ok()
}

/// Email notifier backed by an async SMTP transport
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
    dry_run: bool,
}

impl SmtpNotifier {
    /// Create a new SMTP notifier
    ///
    /// The connection is made lazily when the first message is sent.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is invalid or the
    /// transport cannot be built.
    #[tracing::instrument(
        name = "smtp_notifier_new",
        skip(config),
        fields(host = %config.host, port = config.port, secure = config.secure)
    )]
    pub fn new(config: SmtpConfig) -> Result<Self> {
        config.validate()?;

        let from = Mailbox::new(
            Some(config.from_name.clone()),
            parse_address(&config.from_address, "sender")?,
        );
        let to = Mailbox::new(None, parse_address(&config.recipient, "recipient")?);

        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| Error::config(format!("Failed to build SMTP transport: {}", e)))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(config.username, config.password))
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        tracing::debug!(dry_run = config.dry_run, "SMTP notifier initialized");

        Ok(Self {
            transport,
            from,
            to,
            dry_run: config.dry_run,
        })
    }

    /// Build the multipart message for a notification
    pub fn build_message(&self, notification: &Notification) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(notification.subject())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(notification.body().to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(notification.html_body()),
                    ),
            )
            .map_err(|e| Error::notify(format!("Failed to build message: {}", e)))
    }
}

#[async_trait::async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        let message = self.build_message(notification)?;

        if self.dry_run {
            tracing::info!(
                to = %self.to,
                subject = notification.subject(),
                body = notification.body(),
                "Dry run: email not sent"
            );
            return Ok(());
        }

        self.transport
            .send(message)
            .await
            .map_err(|e| Error::notify(format!("SMTP send failed: {}", e)))?;

        tracing::debug!(to = %self.to, subject = notification.subject(), "Email sent");

        Ok(())
    }

    fn notifier_name(&self) -> &'static str {
        "smtp"
    }
}
