//! Export progress accounting.
//!
//! Tracks completed units against a total that may grow while the export
//! runs: the orchestrator raises the total as it starts each zoom level, so a
//! progress bar fed from here never moves backward.
//!
//! ```text
//! TileFetcher                 ProgressReporter               caller
//!    │ set_total(level tiles)        │                          │
//!    ├──────────────────────────────►│ callback(0, total)       │
//!    │                               ├─────────────────────────►│
//!    │ report(1)                     │                          │
//!    ├──────────────────────────────►│ callback(1, total)       │
//!    │                               ├─────────────────────────►│
//! ```

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Callback receiving `(units_delta, current_total)`.
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Point-in-time progress values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressState {
    /// Units completed so far
    pub done: u64,
    /// Units known so far
    pub total: u64,
}

impl ProgressState {
    /// Progress as a fraction in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.done as f64 / self.total as f64
    }
}

/// Thread-safe progress sink forwarding updates to a caller-supplied callback.
///
/// `done` only increases and `total` only grows. Reported values always
/// satisfy `done <= total`.
pub struct ProgressReporter {
    state: Mutex<ProgressState>,
    callback: Option<ProgressCallback>,
}

impl ProgressReporter {
    /// Creates a reporter that forwards every update to `callback`.
    ///
    /// The callback runs under the reporter's lock and must not call back into it.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(u64, u64) + Send + Sync + 'static,
    {
        Self {
            state: Mutex::new(ProgressState::default()),
            callback: Some(Box::new(callback)),
        }
    }

    /// Creates a reporter without a callback.
    pub fn silent() -> Self {
        Self {
            state: Mutex::new(ProgressState::default()),
            callback: None,
        }
    }

    /// Marks `units` more units as completed.
    pub fn report(&self, units: u64) {
        if units == 0 {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.done += units;
        // Work finished ahead of its planning still keeps the bar bounded
        state.total = state.total.max(state.done);
        self.emit(units, state.total);
    }

    /// Raises the total to `units`; lower values are ignored.
    pub fn set_total(&self, units: u64) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if units <= state.total {
            return;
        }
        state.total = units;
        self.emit(0, state.total);
    }

    /// Returns the current values.
    pub fn snapshot(&self) -> ProgressState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, delta: u64, total: u64) {
        if let Some(callback) = &self.callback {
            callback(delta, total);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::silent()
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("state", &self.snapshot())
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}
