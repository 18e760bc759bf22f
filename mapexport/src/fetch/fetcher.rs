//! Level-by-level tile fetcher with a bounded worker pool.

use super::config::FetchConfig;
use super::state::{ExportState, StateCell};
use super::tile::fetch_tile_with_retry;
use super::types::{DownloadedTile, FetchOutcome, TileFailure};
use crate::error::ExportError;
use crate::export::ExportToken;
use crate::plan::{estimate_byte_size, ExportPlan, TileGridPlan};
use crate::progress::ProgressReporter;
use crate::provider::TileSource;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How a single zoom level ended.
enum LevelStatus {
    Done,
    Cancelled,
}

/// Downloads every tile of an [`ExportPlan`] from a [`TileSource`].
///
/// Levels are fetched in plan order, highest zoom first. Within a level at
/// most [`FetchConfig::concurrency`] tiles are in flight; a tile is only
/// spawned once a pool permit is available.
pub struct TileFetcher<S: TileSource> {
    source: Arc<S>,
    config: FetchConfig,
    state: StateCell,
}

impl<S: TileSource> TileFetcher<S> {
    pub fn new(source: Arc<S>, config: FetchConfig) -> Self {
        Self {
            source,
            config,
            state: StateCell::new(),
        }
    }

    /// Reports lifecycle changes into an existing cell instead of a private one.
    pub fn with_state(mut self, state: StateCell) -> Self {
        self.state = state;
        self
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ExportState {
        self.state.get()
    }

    /// Fetches all planned tiles.
    ///
    /// Returns [`FetchOutcome::Cancelled`] if `token` is requested at any
    /// point; partial results are discarded. The first tile that exhausts its
    /// retries, or fails permanently, aborts the remaining work and is
    /// reported as [`ExportError::Fetch`].
    pub async fn fetch(
        &self,
        plan: &ExportPlan,
        progress: &ProgressReporter,
        token: &ExportToken,
    ) -> Result<FetchOutcome, ExportError> {
        self.state.set(ExportState::Planning);

        let total = plan.total_tiles();
        let estimated_mb = estimate_byte_size(total) / 1_000_000.0;
        if total > self.config.warn_tile_count() {
            warn!(
                tiles = total,
                estimated_mb,
                threshold = self.config.warn_tile_count(),
                "Export is very large and may take a long time"
            );
        } else {
            debug!(tiles = total, estimated_mb, "Export planned");
        }

        if token.is_requested() {
            self.state.set(ExportState::Cancelled);
            return Ok(FetchOutcome::Cancelled);
        }

        self.state.set(ExportState::Fetching);
        let cancellation_token = token.child();
        let mut tiles = Vec::with_capacity(usize::try_from(total).unwrap_or(0));
        let mut announced = 0u64;

        for level in plan.levels() {
            if cancellation_token.is_cancelled() {
                self.state.set(ExportState::Cancelled);
                return Ok(FetchOutcome::Cancelled);
            }

            announced += level.tile_count();
            progress.set_total(announced);

            info!(
                zoom = level.zoom(),
                tiles = level.tile_count(),
                cols = level.cols(),
                rows = level.rows(),
                "Fetching zoom level"
            );

            match self
                .fetch_level(level, progress, &cancellation_token, &mut tiles)
                .await
            {
                Ok(LevelStatus::Done) => {}
                Ok(LevelStatus::Cancelled) => {
                    self.state.set(ExportState::Cancelled);
                    return Ok(FetchOutcome::Cancelled);
                }
                Err(e) => {
                    self.state.set(ExportState::Failed);
                    return Err(e);
                }
            }
        }

        tiles.sort_by_key(|t| t.address);
        self.state.set(ExportState::Completed);
        Ok(FetchOutcome::Completed(tiles))
    }

    async fn fetch_level(
        &self,
        level: &TileGridPlan,
        progress: &ProgressReporter,
        cancellation_token: &CancellationToken,
        tiles: &mut Vec<DownloadedTile>,
    ) -> Result<LevelStatus, ExportError> {
        let pool = Arc::new(Semaphore::new(self.config.concurrency()));
        let mut downloads: JoinSet<Result<DownloadedTile, TileFailure>> = JoinSet::new();
        let mut pending = level.addresses();
        let mut next = pending.next();

        while next.is_some() || !downloads.is_empty() {
            tokio::select! {
                biased;

                _ = cancellation_token.cancelled() => {
                    debug!(
                        zoom = level.zoom(),
                        in_flight = downloads.len(),
                        "Fetch cancelled, aborting remaining downloads"
                    );
                    downloads.abort_all();
                    return Ok(LevelStatus::Cancelled);
                }

                permit = Arc::clone(&pool).acquire_owned(), if next.is_some() => {
                    let permit = permit
                        .map_err(|e| ExportError::Internal(format!("fetch pool closed: {}", e)))?;
                    if let Some(tile) = next.take() {
                        downloads.spawn(fetch_tile_with_retry(
                            Arc::clone(&self.source),
                            tile,
                            self.config,
                            cancellation_token.clone(),
                            permit,
                        ));
                    }
                    next = pending.next();
                }

                Some(result) = downloads.join_next(), if !downloads.is_empty() => {
                    match result {
                        Ok(Ok(tile)) => {
                            tiles.push(tile);
                            progress.report(1);
                        }
                        Ok(Err(TileFailure::Cancelled)) => {}
                        Ok(Err(TileFailure::Exhausted { tile, attempts, message })) => {
                            warn!(tile = %tile, attempts, error = %message, "Tile fetch failed");
                            cancellation_token.cancel();
                            downloads.abort_all();
                            return Err(ExportError::Fetch { tile, attempts, message });
                        }
                        Err(join_err) if join_err.is_cancelled() => {}
                        Err(join_err) => {
                            warn!(error = %join_err, "Tile fetch task panicked");
                            cancellation_token.cancel();
                            downloads.abort_all();
                            return Err(ExportError::Internal(format!(
                                "tile fetch task failed: {}",
                                join_err
                            )));
                        }
                    }
                }
            }
        }

        Ok(LevelStatus::Done)
    }
}
