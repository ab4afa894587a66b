// # Monitor State
//
// In-memory holder of the last-known fingerprint.
//
// ## Purpose
//
// Carries the only piece of cross-cycle state: the fingerprint of the most
// recently fingerprinted region. Comparison and update happen in one call,
// so a caller can never observe a change without the state having moved.
//
// ## Crash Behavior
//
// - All state is lost on restart
// - The first cycle after a restart establishes a fresh baseline
// - No recovery is attempted (state is in-memory only)
//
// ## Ownership
//
// `MonitorState` is a plain value owned by the `Monitor`. Mutation requires
// `&mut self`, so no locking is involved.

use crate::fingerprint::Fingerprint;

/// Result of comparing a fresh fingerprint against the stored one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No fingerprint was stored; the new one is now the baseline
    Baseline(Fingerprint),
    /// The new fingerprint equals the stored one
    Unchanged(Fingerprint),
    /// The new fingerprint differs; the stored one has been replaced
    Changed {
        /// Fingerprint stored before this comparison
        previous: Fingerprint,
        /// Fingerprint stored after this comparison
        current: Fingerprint,
    },
}

impl Outcome {
    /// Whether this outcome calls for a change notification
    pub fn is_change(&self) -> bool {
        matches!(self, Outcome::Changed { .. })
    }

    /// The fingerprint stored once this outcome was produced
    pub fn current(&self) -> &Fingerprint {
        match self {
            Outcome::Baseline(current) | Outcome::Unchanged(current) => current,
            Outcome::Changed { current, .. } => current,
        }
    }
}

/// Last-known fingerprint of the watched region
///
/// # Example
///
/// ```rust
/// use pagewatch_core::{fingerprint, MonitorState, Outcome};
///
/// let mut state = MonitorState::new();
/// assert!(matches!(state.compare_and_update(fingerprint("a")), Outcome::Baseline(_)));
/// assert!(matches!(state.compare_and_update(fingerprint("a")), Outcome::Unchanged(_)));
/// assert!(state.compare_and_update(fingerprint("b")).is_change());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    last: Option<Fingerprint>,
}

impl MonitorState {
    /// Create an empty state (no baseline yet)
    pub fn new() -> Self {
        Self::default()
    }

    /// The last-known fingerprint, if a baseline exists
    pub fn last(&self) -> Option<&Fingerprint> {
        self.last.as_ref()
    }

    /// Whether a baseline has been established
    pub fn has_baseline(&self) -> bool {
        self.last.is_some()
    }

    /// Compare `fingerprint` with the stored one and update the state
    ///
    /// On [`Outcome::Changed`] the state already holds the new fingerprint
    /// when this returns, before any notification is attempted.
    pub fn compare_and_update(&mut self, fingerprint: Fingerprint) -> Outcome {
        match self.last.take() {
            None => {
                self.last = Some(fingerprint.clone());
                Outcome::Baseline(fingerprint)
            }
            Some(previous) if previous == fingerprint => {
                self.last = Some(previous);
                Outcome::Unchanged(fingerprint)
            }
            Some(previous) => {
                self.last = Some(fingerprint.clone());
                Outcome::Changed {
                    previous,
                    current: fingerprint,
                }
            }
        }
    }
}
