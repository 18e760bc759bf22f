//! Export error type.

use crate::coord::TileAddress;
use crate::plan::PlanningError;
use thiserror::Error;

/// Reasons an export can fail.
///
/// Cancellation is not an error; it is reported as
/// [`ExportOutcome::Cancelled`](crate::export::ExportOutcome::Cancelled).
#[derive(Debug, Error)]
pub enum ExportError {
    /// Bounds or zoom rejected before any network I/O
    #[error("invalid export request: {0}")]
    Planning(#[from] PlanningError),

    /// A tile could not be fetched even after retrying
    #[error("failed to fetch tile {tile} after {attempts} attempt(s): {message}")]
    Fetch {
        tile: TileAddress,
        attempts: u32,
        message: String,
    },

    /// Assembled index and payload disagree
    #[error("container assembly failed: {0}")]
    AssemblyInvariant(String),

    /// The cancellation token is already driving another export
    #[error("export token is already in use by a running export")]
    TokenInUse,

    /// The session is already running an export
    #[error("an export is already in progress")]
    Busy,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ExportError {
    /// The tile that failed, for fetch errors.
    pub fn failed_tile(&self) -> Option<TileAddress> {
        match self {
            ExportError::Fetch { tile, .. } => Some(*tile),
            _ => None,
        }
    }
}
