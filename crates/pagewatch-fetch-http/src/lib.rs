// # HTTP Fetcher
//
// This crate provides an HTTP(S) fetcher for the pagewatch monitor.
//
// ## Behavior
//
// - One GET request per `fetch()` call
// - Sends an identifying `User-Agent` header on every request
// - Bounded by a client-wide timeout so a hung server cannot stall the monitor
// - Any transport error, non-2xx status, or undecodable body is an error
// - No retries: the monitor's next cycle is the retry

use pagewatch_core::traits::Fetcher;
use pagewatch_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default identifying user agent
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36 WebsiteChangeMonitor/1.0";

/// Default request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP fetcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpFetcherConfig {
    /// `User-Agent` header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl HttpFetcherConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.user_agent.trim().is_empty() {
            return Err(Error::config("HTTP user agent cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(Error::config("HTTP fetch timeout must be > 0"));
        }
        Ok(())
    }
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// HTTP-based document fetcher
pub struct HttpFetcher {
    /// HTTP client (carries user agent and timeout)
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: &HttpFetcherConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, target: &str) -> Result<String> {
        tracing::debug!(url = %target, "Sending GET request");

        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| Error::fetch(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(format!("HTTP error: {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::fetch(format!("Failed to read response: {}", e)))?;

        tracing::debug!(url = %target, status = %status, bytes = body.len(), "Fetched document");

        Ok(body)
    }

    fn fetcher_name(&self) -> &'static str {
        "http"
    }
}
