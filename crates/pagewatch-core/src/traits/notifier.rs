// # Notifier Trait
//
// Defines the interface for delivering notifications to the operator.
//
// ## Implementations
//
// - SMTP: `pagewatch-notify-smtp` crate
//
// ## Usage
//
// ```rust,ignore
// use pagewatch_core::{Notification, Notifier};
// use std::time::Duration;
//
// let notifier = /* Notifier implementation */;
// let started = Notification::started("https://example.com", Duration::from_secs(60));
// notifier.notify(&started).await?;
// ```

use crate::notification::Notification;
use async_trait::async_trait;

/// Trait for notifier implementations
///
/// The subject and body are opaque text. An implementation may additionally
/// deliver [`Notification::html_body`] when its channel supports it.
///
/// # Delivery Contract
///
/// The monitor calls `notify` at most once per event and never retries. A
/// returned error is logged by the monitor and otherwise ignored; it does
/// not affect change-detection state.
///
/// Implementations must bound delivery with a timeout and must not spawn
/// background work that outlives the call.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The notification was handed off to the channel
    /// - `Err(Error)`: Delivery failed
    async fn notify(&self, notification: &Notification) -> Result<(), crate::Error>;

    /// Get the notifier name (for logging/debugging)
    fn notifier_name(&self) -> &'static str;
}
