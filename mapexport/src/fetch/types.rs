//! Fetch results.

use crate::coord::TileAddress;

/// What the source returned for one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileOutcome {
    /// Encoded image bytes, stored verbatim in the container
    Image(Vec<u8>),
    /// The source has no imagery here; nothing is stored
    Blank,
}

/// A tile address paired with its fetch outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedTile {
    pub address: TileAddress,
    pub outcome: TileOutcome,
}

impl DownloadedTile {
    pub fn image(address: TileAddress, data: Vec<u8>) -> Self {
        Self {
            address,
            outcome: TileOutcome::Image(data),
        }
    }

    pub fn blank(address: TileAddress) -> Self {
        Self {
            address,
            outcome: TileOutcome::Blank,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self.outcome, TileOutcome::Blank)
    }

    /// Image bytes, if any.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.outcome {
            TileOutcome::Image(data) => Some(data),
            TileOutcome::Blank => None,
        }
    }
}

/// Result of a fetch run that did not fail.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Every planned tile has an outcome, sorted by `(zoom, row, col)`
    Completed(Vec<DownloadedTile>),
    /// Cancellation was requested; partial results were dropped
    Cancelled,
}

/// Why a single tile task stopped without a result.
#[derive(Debug)]
pub(crate) enum TileFailure {
    Cancelled,
    Exhausted {
        tile: TileAddress,
        attempts: u32,
        message: String,
    },
}
