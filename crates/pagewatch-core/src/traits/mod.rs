//! Core traits for the pagewatch system
//!
//! This module defines the abstract interfaces that collaborators must follow.
//!
//! - [`Fetcher`]: Retrieve the watched document
//! - [`Notifier`]: Deliver notifications

pub mod fetcher;
pub mod notifier;

pub use fetcher::Fetcher;
pub use notifier::Notifier;
