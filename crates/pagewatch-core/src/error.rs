//! Error types for the pagewatch system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for pagewatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the pagewatch system
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure retrieving the watched document
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Failure delivering a notification
    #[error("Notification error: {0}")]
    Notify(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a notification error
    pub fn notify(msg: impl Into<String>) -> Self {
        Self::Notify(msg.into())
    }

    /// Whether this error must stop the process at startup
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
