//! Tile fetch orchestration.
//!
//! [`TileFetcher`] walks an [`ExportPlan`](crate::plan::ExportPlan) level by
//! level and downloads every tile through a [`TileSource`](crate::provider::TileSource).
//!
//! # Concurrency
//!
//! Each level runs a pool of at most [`FetchConfig::concurrency`] tasks. The
//! dispatcher takes a semaphore permit before spawning, so tiles waiting for
//! a slot are plain addresses and not parked tasks.
//!
//! # Failure and cancellation
//!
//! - `NotFound` or an empty body is a blank tile, not a failure.
//! - Transient errors and timeouts are retried up to
//!   [`FetchConfig::max_retries`] attempts with exponential backoff.
//! - The first tile that fails for good cancels its siblings and the whole
//!   fetch returns [`ExportError::Fetch`](crate::error::ExportError::Fetch).
//! - Cancelling the [`ExportToken`](crate::export::ExportToken) aborts
//!   in-flight requests and backoff sleeps and yields [`FetchOutcome::Cancelled`].

mod config;
mod fetcher;
mod state;
mod tile;
mod types;

pub use config::FetchConfig;
pub use fetcher::TileFetcher;
pub use state::{ExportState, StateCell};
pub use types::{DownloadedTile, FetchOutcome, TileOutcome};

#[cfg(test)]
mod tests;
