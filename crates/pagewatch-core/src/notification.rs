//! Notification events
//!
//! A [`Notification`] is a subject plus a plain-text body, built once and
//! handed to a [`Notifier`](crate::Notifier) by reference.

use crate::fingerprint::Fingerprint;
use std::time::Duration;

/// What a notification reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    /// The monitor has started polling
    Started {
        /// Watched target
        target: String,
        /// Poll interval
        interval: Duration,
    },
    /// The watched region changed between two cycles
    Changed {
        /// Watched target
        target: String,
        /// Fingerprint before the change
        previous: Fingerprint,
        /// Fingerprint after the change
        current: Fingerprint,
    },
}

/// Immutable, human-readable notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    kind: NotificationKind,
    subject: String,
    body: String,
}

impl Notification {
    /// "Monitor started" notification
    pub fn started(target: impl Into<String>, interval: Duration) -> Self {
        let target = target.into();
        let subject = "Website Monitor Application Started".to_string();
        let body = format!(
            "The website monitoring application for {} has started successfully.\n\
             It will check for changes every {} seconds.",
            target,
            format_seconds(interval)
        );

        Self {
            kind: NotificationKind::Started { target, interval },
            subject,
            body,
        }
    }

    /// "Content changed" notification carrying both fingerprints
    pub fn changed(target: impl Into<String>, previous: Fingerprint, current: Fingerprint) -> Self {
        let target = target.into();
        let subject = format!("Website Changed: {}", target);
        let body = format!(
            "The content of {target} has changed.\n\n\
             Previous hash: {previous}\n\
             New hash: {current}\n\n\
             Check the site: {target}"
        );

        Self {
            kind: NotificationKind::Changed {
                target,
                previous,
                current,
            },
            subject,
            body,
        }
    }

    /// What triggered this notification
    pub fn kind(&self) -> &NotificationKind {
        &self.kind
    }

    /// Email subject line
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Plain-text body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// HTML rendering of the body
    ///
    /// The text is escaped, line breaks become `<br>`, and the result is
    /// wrapped in a single paragraph.
    pub fn html_body(&self) -> String {
        let escaped = self
            .body
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;");
        format!("<p>{}</p>", escaped.replace('\n', "<br>"))
    }
}

/// Render a duration in seconds, without a trailing `.0` for whole values
fn format_seconds(interval: Duration) -> String {
    let millis = interval.as_millis();
    if millis % 1000 == 0 {
        (millis / 1000).to_string()
    } else {
        format!("{}", interval.as_secs_f64())
    }
}
