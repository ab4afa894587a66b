// # pagewatch-core
//
// Core library for the pagewatch change-detection monitor.
//
// ## Architecture Overview
//
// This library provides the change-detection cycle:
// - **Fetcher**: Trait for retrieving the watched document
// - **Notifier**: Trait for delivering human-readable notifications
// - **extract**: Isolates the stable region between two markers
// - **fingerprint**: Deterministic digest of the extracted region
// - **MonitorState**: Last-known fingerprint with compare-and-update semantics
// - **Monitor**: Cycle driver that runs fetch → extract → fingerprint →
//   compare → notify on a fixed interval
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Transports live in adapter crates
// 2. **Single Owner**: Cross-cycle state is owned by the `Monitor` alone
// 3. **Serialized Cycles**: A cycle never starts while another is in flight
// 4. **Library-First**: All core functionality can be used as a library
// 5. **Best-Effort Delivery**: Notification failures never roll back state

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod extract;
pub mod fingerprint;
pub mod notification;
pub mod state;

// Re-export core types for convenience
pub use traits::{Fetcher, Notifier};
pub use engine::{CycleOutcome, Monitor, MonitorEvent};
pub use config::{Markers, MonitorConfig};
pub use error::{Error, Result};
pub use fingerprint::{Fingerprint, fingerprint};
pub use notification::{Notification, NotificationKind};
pub use state::{MonitorState, Outcome};
