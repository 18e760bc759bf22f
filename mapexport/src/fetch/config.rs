//! Fetch orchestrator configuration.

use crate::config::{
    DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_RETRY_BASE_DELAY_MS,
};
use crate::plan::DEFAULT_WARN_TILE_COUNT;
use std::time::Duration;

/// Configuration for the tile fetch worker pool.
///
/// # Example
///
/// ```
/// use mapexport::fetch::FetchConfig;
/// use std::time::Duration;
///
/// let config = FetchConfig::default();
/// assert_eq!(config.concurrency(), 8);
/// assert_eq!(config.max_retries(), 3);
///
/// let config = FetchConfig::new()
///     .with_concurrency(4)
///     .with_request_timeout(Duration::from_secs(10));
/// assert_eq!(config.concurrency(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchConfig {
    /// Maximum number of tile requests in flight
    concurrency: usize,
    /// Attempts per tile before the export fails
    max_retries: u32,
    /// Limit for a single tile request
    request_timeout: Duration,
    /// First backoff step; doubles per attempt
    retry_base_delay: Duration,
    /// Tile count above which planning logs a warning
    warn_tile_count: u64,
}

impl FetchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker pool size. Clamped to at least 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the number of attempts per tile. Clamped to at least 1.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries.max(1);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn with_warn_tile_count(mut self, count: u64) -> Self {
        self.warn_tile_count = count;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn retry_base_delay(&self) -> Duration {
        self.retry_base_delay
    }

    pub fn warn_tile_count(&self) -> u64 {
        self.warn_tile_count
    }

    /// Delay before the retry that follows `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.retry_base_delay.saturating_mul(factor)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            max_retries: DEFAULT_MAX_RETRIES,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            retry_base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS),
            warn_tile_count: DEFAULT_WARN_TILE_COUNT,
        }
    }
}
