//! Configuration types for the pagewatch system
//!
//! This module defines the monitor configuration. Transport-specific settings
//! (HTTP client, SMTP connection) live with their adapter crates.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default start marker of the watched region
pub const DEFAULT_START_MARKER: &str = "<!-- Header / End -->";

/// Default end marker of the watched region
pub const DEFAULT_END_MARKER: &str = "<!-- Footer ";

/// Main monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Target identifier (URL) of the watched document
    pub target: String,

    /// Poll interval in milliseconds
    pub interval_ms: u64,

    /// Markers bounding the watched region
    #[serde(default)]
    pub markers: Markers,

    /// Capacity of the monitor event channel
    ///
    /// When full, new events are dropped (with a warning log).
    ///
    /// Default: 100 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl MonitorConfig {
    /// Create a configuration with default markers
    pub fn new(target: impl Into<String>, interval: Duration) -> Self {
        Self {
            target: target.into(),
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            markers: Markers::default(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Set the region markers
    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    /// Set the event channel capacity
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity;
        self
    }

    /// Poll interval as a `Duration`
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        let target = self.target.trim();
        if target.is_empty() {
            return Err(crate::Error::config("Target URL cannot be empty"));
        }
        if !target.starts_with("http://") && !target.starts_with("https://") {
            return Err(crate::Error::config(format!(
                "Target URL must use HTTP or HTTPS scheme. Got: {}",
                target
            )));
        }
        if self.interval_ms == 0 {
            return Err(crate::Error::config("Poll interval must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }

        self.markers.validate()?;

        Ok(())
    }
}

/// Textual markers bounding the watched region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markers {
    /// Marker at which the region starts (included)
    #[serde(default = "default_start_marker")]
    pub start: String,

    /// Marker at which the region ends (excluded)
    #[serde(default = "default_end_marker")]
    pub end: String,
}

impl Markers {
    /// Create a marker pair
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Validate the marker pair
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.start.is_empty() {
            return Err(crate::Error::config("Start marker cannot be empty"));
        }
        if self.end.is_empty() {
            return Err(crate::Error::config("End marker cannot be empty"));
        }
        Ok(())
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self::new(default_start_marker(), default_end_marker())
    }
}

fn default_start_marker() -> String {
    DEFAULT_START_MARKER.to_string()
}

fn default_end_marker() -> String {
    DEFAULT_END_MARKER.to_string()
}

fn default_event_channel_capacity() -> usize {
    100
}
