//! Single-tile fetch with retry, timeout and cancellation.

use super::config::FetchConfig;
use super::types::{DownloadedTile, TileFailure};
use crate::coord::TileAddress;
use crate::provider::TileSource;
use std::sync::Arc;
use tokio::sync::OwnedSemaphorePermit;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Fetches one tile, retrying transient failures with exponential backoff.
///
/// The permit is held until the task finishes so the pool size bounds the
/// number of tiles in flight, backoff sleeps included.
pub(crate) async fn fetch_tile_with_retry<S: TileSource>(
    source: Arc<S>,
    tile: TileAddress,
    config: FetchConfig,
    cancellation_token: CancellationToken,
    _permit: OwnedSemaphorePermit,
) -> Result<DownloadedTile, TileFailure> {
    let max_attempts = config.max_retries();
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        if cancellation_token.is_cancelled() {
            return Err(TileFailure::Cancelled);
        }

        let result = tokio::select! {
            biased;
            _ = cancellation_token.cancelled() => {
                return Err(TileFailure::Cancelled);
            }
            result = tokio::time::timeout(config.request_timeout(), source.fetch_tile(tile)) => result,
        };

        match result {
            Ok(Ok(data)) if data.is_empty() => {
                trace!(tile = %tile, "Empty tile body, storing as blank");
                return Ok(DownloadedTile::blank(tile));
            }
            Ok(Ok(data)) => {
                trace!(tile = %tile, bytes = data.len(), attempt, "Tile fetched");
                return Ok(DownloadedTile::image(tile, data));
            }
            Ok(Err(e)) if e.is_missing_tile() => {
                trace!(tile = %tile, "Source has no tile, storing as blank");
                return Ok(DownloadedTile::blank(tile));
            }
            Ok(Err(e)) => {
                last_error = e.to_string();
                if !e.is_retryable() {
                    debug!(tile = %tile, error = %e, "Permanent tile failure");
                    return Err(TileFailure::Exhausted {
                        tile,
                        attempts: attempt,
                        message: last_error,
                    });
                }
                debug!(tile = %tile, attempt, error = %e, "Tile fetch failed, will retry");
            }
            Err(_) => {
                last_error = format!("timed out after {:?}", config.request_timeout());
                debug!(tile = %tile, attempt, "Tile fetch timed out");
            }
        }

        if attempt < max_attempts {
            tokio::select! {
                biased;
                _ = cancellation_token.cancelled() => {
                    return Err(TileFailure::Cancelled);
                }
                _ = tokio::time::sleep(config.backoff_for(attempt)) => {}
            }
        }
    }

    Err(TileFailure::Exhausted {
        tile,
        attempts: max_attempts,
        message: last_error,
    })
}
