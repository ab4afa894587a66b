//! Test doubles and common utilities for monitor contract tests
//!
//! These doubles stand in for the fetch and notify collaborators and record
//! how the monitor drives them.

#![allow(dead_code)]

use pagewatch_core::config::MonitorConfig;
use pagewatch_core::error::{Error, Result};
use pagewatch_core::traits::{Fetcher, Notifier};
use pagewatch_core::{MonitorEvent, Notification};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Wrap a body in the default region markers
pub fn page(body: &str) -> String {
    format!("<!-- Header / End -->{}<!-- Footer -->", body)
}

/// Same region as [`page`], different surroundings
pub fn noisy_page(body: &str, noise: &str) -> String {
    format!(
        "<p>{noise}</p><!-- Header / End -->{body}<!-- Footer --><p>{noise}</p>"
    )
}

/// A fetcher that replays a script of responses, one per call
///
/// Once the script is exhausted every call fails.
#[derive(Clone)]
pub struct ScriptedFetcher {
    script: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedFetcher {
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = std::result::Result<String, String>>,
    {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times fetch() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, _target: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(content)) => Ok(content),
            Some(Err(message)) => Err(Error::fetch(message)),
            None => Err(Error::fetch("script exhausted")),
        }
    }

    fn fetcher_name(&self) -> &'static str {
        "scripted"
    }
}

/// A fetcher that returns the same content forever
#[derive(Clone)]
pub struct RepeatingFetcher {
    content: String,
    calls: Arc<AtomicUsize>,
}

impl RepeatingFetcher {
    pub fn new(content: String) -> Self {
        Self {
            content,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Fetcher for RepeatingFetcher {
    async fn fetch(&self, _target: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.content.clone())
    }

    fn fetcher_name(&self) -> &'static str {
        "repeating"
    }
}

/// A fetcher that takes `delay` per call and tracks concurrent calls
#[derive(Clone)]
pub struct SlowFetcher {
    delay: Duration,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl SlowFetcher {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Highest number of fetches observed running at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Fetcher for SlowFetcher {
    async fn fetch(&self, _target: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(page("slow"))
    }

    fn fetcher_name(&self) -> &'static str {
        "slow"
    }
}

/// A notifier that records every notification it is asked to deliver
#[derive(Clone)]
pub struct RecordingNotifier {
    attempts: Arc<Mutex<Vec<Notification>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            attempts: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// A notifier whose every delivery fails (attempts are still recorded)
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Every notification passed to notify()
    pub fn attempts(&self) -> Vec<Notification> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        self.attempts.lock().unwrap().push(notification.clone());
        if self.fail {
            Err(Error::notify("delivery refused"))
        } else {
            Ok(())
        }
    }

    fn notifier_name(&self) -> &'static str {
        "recording"
    }
}

/// Helper to create a minimal MonitorConfig for testing
pub fn test_config(interval: Duration) -> MonitorConfig {
    MonitorConfig::new("https://example.com/watched", interval)
}

/// Drain every event currently buffered in the channel
pub fn drain_events(rx: &mut mpsc::Receiver<MonitorEvent>) -> Vec<MonitorEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
