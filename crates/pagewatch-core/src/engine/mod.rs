//! Change-detection cycle driver
//!
//! The Monitor is responsible for:
//! - Announcing startup via the Notifier
//! - Running one detection cycle immediately, then one per interval
//! - Carrying the last-known fingerprint across cycles
//! - Notifying once per detected change
//!
//! ## Architecture
//!
//! ```text
//!            tick (interval, never overlapping)
//!                          │
//!                          ▼
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  Fetcher    │──▶│   extract    │──▶│ fingerprint  │──▶│ MonitorState │
//! │  (fetch)    │   │  (markers)   │   │  (sha-256)   │   │  (compare)   │
//! └─────────────┘   └──────────────┘   └──────────────┘   └──────────────┘
//!                                                                 │ Changed
//!                                                                 ▼
//!                                                          ┌──────────────┐
//!                                                          │  Notifier    │
//!                                                          └──────────────┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Fetch content; on failure log and end the cycle
//! 2. Extract the region between the markers and fingerprint it
//! 3. Compare-and-update the stored fingerprint
//! 4. On change, send one notification carrying both fingerprints
//! 5. Emit events for monitoring/logging

use crate::config::MonitorConfig;
use crate::error::Result;
use crate::extract::extract;
use crate::fingerprint::{Fingerprint, fingerprint};
use crate::notification::Notification;
use crate::state::{MonitorState, Outcome};
use crate::traits::{Fetcher, Notifier};
use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::MissedTickBehavior;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;
use tracing::{Instrument, debug, error, info, warn};

/// Events emitted by the Monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Monitor started
    Started {
        target: String,
        at: DateTime<Utc>,
    },

    /// A notification was handed to the notifier
    NotificationSent {
        subject: String,
    },

    /// A notification could not be delivered
    NotificationFailed {
        subject: String,
        error: String,
    },

    /// A cycle was skipped because the fetch failed
    FetchFailed {
        cycle: u64,
        error: String,
    },

    /// The first successful cycle stored its fingerprint
    BaselineEstablished {
        cycle: u64,
        fingerprint: Fingerprint,
    },

    /// The region matched the stored fingerprint
    Unchanged {
        cycle: u64,
        fingerprint: Fingerprint,
    },

    /// The region differed from the stored fingerprint
    ChangeDetected {
        cycle: u64,
        previous: Fingerprint,
        current: Fingerprint,
        at: DateTime<Utc>,
    },

    /// Monitor stopped
    Stopped {
        reason: String,
    },
}

/// Result of a single detection cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Fetch failed; state untouched, nothing sent
    FetchFailed { error: String },
    /// First successful cycle; nothing sent
    Baseline { fingerprint: Fingerprint },
    /// Region unchanged; nothing sent
    Unchanged { fingerprint: Fingerprint },
    /// Region changed; one notification attempted
    Changed {
        previous: Fingerprint,
        current: Fingerprint,
        /// Whether the notifier accepted the notification
        notified: bool,
    },
}

/// Change-detection monitor
///
/// The monitor owns the fetcher, the notifier, and the [`MonitorState`].
/// Every cycle takes `&mut self`, so two cycles can never run at the same
/// time and the state has exactly one writer.
///
/// ## Lifecycle
///
/// 1. Create with [`Monitor::new()`] (validates configuration)
/// 2. Start with [`Monitor::run()`]
/// 3. Monitor polls until a shutdown signal is received
///
/// ## Scheduling
///
/// The first cycle runs immediately after the startup notification. Later
/// cycles run on a fixed interval. If a cycle outlasts the interval, the
/// missed ticks are skipped rather than queued.
pub struct Monitor {
    /// Fetcher for the watched document
    fetcher: Box<dyn Fetcher>,

    /// Notifier for startup and change notifications
    notifier: Box<dyn Notifier>,

    /// Monitor settings
    config: MonitorConfig,

    /// Last-known fingerprint
    state: MonitorState,

    /// Number of cycles started so far
    cycles: u64,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<MonitorEvent>,
}

impl Monitor {
    /// Create a new monitor
    ///
    /// # Parameters
    ///
    /// - `fetcher`: Fetcher implementation
    /// - `notifier`: Notifier implementation
    /// - `config`: Monitor configuration
    ///
    /// # Returns
    ///
    /// A tuple of (monitor, event_receiver), or `Error::Config` if the
    /// configuration is invalid.
    pub fn new(
        fetcher: Box<dyn Fetcher>,
        notifier: Box<dyn Notifier>,
        config: MonitorConfig,
    ) -> Result<(Self, mpsc::Receiver<MonitorEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let monitor = Self {
            fetcher,
            notifier,
            config,
            state: MonitorState::new(),
            cycles: 0,
            event_tx: tx,
        };

        Ok((monitor, rx))
    }

    /// Run the monitor until SIGINT
    ///
    /// Recoverable errors (fetch and notification failures) are logged and
    /// never end the loop, so once `Monitor::new` has succeeded the run
    /// itself cannot fail.
    pub async fn run(&mut self) {
        self.run_with_shutdown(None).await
    }

    /// Run the monitor until `shutdown_rx` fires
    ///
    /// With `None`, waits for ctrl-c instead. Dropping the sender also
    /// counts as a shutdown request.
    pub async fn run_with_shutdown(
        &mut self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) {
        info!(
            url = %self.config.target,
            interval_ms = self.config.interval_ms,
            fetcher = self.fetcher.fetcher_name(),
            notifier = self.notifier.notifier_name(),
            "Starting monitor"
        );

        self.emit_event(MonitorEvent::Started {
            target: self.config.target.clone(),
            at: Utc::now(),
        });

        let started = Notification::started(self.config.target.as_str(), self.config.interval());
        self.deliver(&started).await;

        // The first tick completes immediately, giving the initial cycle.
        let mut ticker = tokio::time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ticks = IntervalStream::new(ticker);

        let shutdown = async move {
            match shutdown_rx {
                Some(rx) => {
                    let _ = rx.await;
                }
                None => {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        error!("Failed to listen for ctrl-c: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
        };
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                Some(_) = ticks.next() => {
                    // Awaited in place: the next tick is not polled until
                    // this cycle has finished.
                    self.run_cycle().await;
                }

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    self.emit_event(MonitorEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    break;
                }
            }
        }

        info!(cycles = self.cycles, "Monitor stopped");
    }

    /// Run one detection cycle
    ///
    /// Exposed so embedders can drive cycles on their own schedule.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.cycles += 1;
        let cycle = self.cycles;
        let span = tracing::info_span!("cycle", cycle);
        self.detect(cycle).instrument(span).await
    }

    async fn detect(&mut self, cycle: u64) -> CycleOutcome {
        debug!(phase = "fetch", url = %self.config.target, "Checking target");

        let content = match self.fetcher.fetch(&self.config.target).await {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    phase = "fetch",
                    fetcher = self.fetcher.fetcher_name(),
                    error = %e,
                    "Failed to fetch content, skipping this cycle"
                );
                self.emit_event(MonitorEvent::FetchFailed {
                    cycle,
                    error: e.to_string(),
                });
                return CycleOutcome::FetchFailed {
                    error: e.to_string(),
                };
            }
        };

        let markers = &self.config.markers;
        let region = extract(&content, &markers.start, &markers.end);
        let current = fingerprint(region);
        debug!(
            phase = "extract",
            content_len = content.len(),
            region_len = region.len(),
            fingerprint = %current,
            "Extracted region"
        );

        match self.state.compare_and_update(current) {
            Outcome::Baseline(fingerprint) => {
                info!(
                    phase = "compare",
                    fingerprint = %fingerprint,
                    "Initial scan complete, monitoring for changes"
                );
                self.emit_event(MonitorEvent::BaselineEstablished {
                    cycle,
                    fingerprint: fingerprint.clone(),
                });
                CycleOutcome::Baseline { fingerprint }
            }
            Outcome::Unchanged(fingerprint) => {
                info!(phase = "compare", "No changes detected");
                self.emit_event(MonitorEvent::Unchanged {
                    cycle,
                    fingerprint: fingerprint.clone(),
                });
                CycleOutcome::Unchanged { fingerprint }
            }
            Outcome::Changed { previous, current } => {
                info!(
                    phase = "compare",
                    %previous,
                    %current,
                    "Content changed"
                );
                self.emit_event(MonitorEvent::ChangeDetected {
                    cycle,
                    previous: previous.clone(),
                    current: current.clone(),
                    at: Utc::now(),
                });

                // State already holds `current`; delivery cannot roll it back.
                let notification = Notification::changed(
                    self.config.target.as_str(),
                    previous.clone(),
                    current.clone(),
                );
                let notified = self.deliver(&notification).await;

                CycleOutcome::Changed {
                    previous,
                    current,
                    notified,
                }
            }
        }
    }

    /// Send a notification once, logging the outcome
    async fn deliver(&self, notification: &Notification) -> bool {
        match self.notifier.notify(notification).await {
            Ok(()) => {
                info!(
                    phase = "notify",
                    notifier = self.notifier.notifier_name(),
                    subject = notification.subject(),
                    "Notification sent"
                );
                self.emit_event(MonitorEvent::NotificationSent {
                    subject: notification.subject().to_string(),
                });
                true
            }
            Err(e) => {
                error!(
                    phase = "notify",
                    notifier = self.notifier.notifier_name(),
                    subject = notification.subject(),
                    error = %e,
                    "Failed to send notification"
                );
                self.emit_event(MonitorEvent::NotificationFailed {
                    subject: notification.subject().to_string(),
                    error: e.to_string(),
                });
                false
            }
        }
    }

    /// Emit a monitor event without blocking the cycle
    fn emit_event(&self, event: MonitorEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            // Nobody is listening; events are optional.
            Err(TrySendError::Closed(_)) => {}
        }
    }

    /// Current change-detection state
    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// Number of cycles started so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Monitor settings
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }
}
