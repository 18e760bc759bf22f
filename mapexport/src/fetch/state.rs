//! Export lifecycle state.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Where an export currently is in its lifecycle.
///
/// ```text
/// Idle ─► Planning ─► Fetching ─┬─► Completed
///                               ├─► Cancelled
///                               └─► Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ExportState {
    Idle = 0,
    Planning = 1,
    Fetching = 2,
    Cancelled = 3,
    Completed = 4,
    Failed = 5,
}

impl ExportState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ExportState::Planning,
            2 => ExportState::Fetching,
            3 => ExportState::Cancelled,
            4 => ExportState::Completed,
            5 => ExportState::Failed,
            _ => ExportState::Idle,
        }
    }

    /// Returns true for Completed, Cancelled and Failed.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExportState::Completed | ExportState::Cancelled | ExportState::Failed
        )
    }
}

impl fmt::Display for ExportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportState::Idle => "idle",
            ExportState::Planning => "planning",
            ExportState::Fetching => "fetching",
            ExportState::Cancelled => "cancelled",
            ExportState::Completed => "completed",
            ExportState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Shared, lock-free cell holding an [`ExportState`].
#[derive(Debug, Clone, Default)]
pub struct StateCell(Arc<AtomicU8>);

impl StateCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> ExportState {
        ExportState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, state: ExportState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        assert_eq!(StateCell::new().get(), ExportState::Idle);
    }

    #[test]
    fn test_clones_share_state() {
        let cell = StateCell::new();
        let other = cell.clone();
        other.set(ExportState::Fetching);
        assert_eq!(cell.get(), ExportState::Fetching);
    }

    #[test]
    fn test_round_trips_every_state() {
        let cell = StateCell::new();
        for state in [
            ExportState::Idle,
            ExportState::Planning,
            ExportState::Fetching,
            ExportState::Cancelled,
            ExportState::Completed,
            ExportState::Failed,
        ] {
            cell.set(state);
            assert_eq!(cell.get(), state);
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ExportState::Fetching.is_terminal());
        assert!(ExportState::Cancelled.is_terminal());
        assert!(ExportState::Failed.is_terminal());
        assert_eq!(ExportState::Completed.to_string(), "completed");
    }
}
