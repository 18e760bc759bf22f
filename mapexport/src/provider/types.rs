//! Provider types and traits

use crate::coord::TileAddress;
use std::future::Future;
use thiserror::Error;

/// Errors that can occur while fetching a tile.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// Transport failure or server-side error; worth retrying
    #[error("HTTP error: {0}")]
    HttpError(String),
    /// Request did not complete in time
    #[error("request timed out")]
    Timeout,
    /// Server asked us to slow down (HTTP 429)
    #[error("rate limited by {0}")]
    Throttled(String),
    /// The source has no tile at this address (outside data coverage)
    #[error("tile not found")]
    NotFound,
    /// Request refused for a reason retrying will not fix
    #[error("HTTP {status} from {url}")]
    Rejected { status: u16, url: String },
    /// Zoom level not supported by this source
    #[error("zoom level {0} not supported by provider")]
    UnsupportedZoom(u8),
    /// Source is misconfigured
    #[error("invalid provider configuration: {0}")]
    InvalidConfiguration(String),
}

impl ProviderError {
    /// Returns true if another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::HttpError(_) | ProviderError::Timeout | ProviderError::Throttled(_)
        )
    }

    /// Returns true if the error means "no imagery here" rather than a failure.
    pub fn is_missing_tile(&self) -> bool {
        matches!(self, ProviderError::NotFound)
    }
}

/// Async source of raster tiles.
///
/// Implementors return the raw encoded image (typically JPEG or PNG) for a
/// tile address, or [`ProviderError::NotFound`] where the source has no data.
pub trait TileSource: Send + Sync + 'static {
    /// Downloads one tile.
    fn fetch_tile(
        &self,
        tile: TileAddress,
    ) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;

    /// Returns the source's name for logging and identification.
    fn name(&self) -> &str;

    /// Returns the minimum supported zoom level.
    fn min_zoom(&self) -> u8;

    /// Returns the maximum supported zoom level.
    fn max_zoom(&self) -> u8;

    /// Checks if this source supports the given zoom level.
    fn supports_zoom(&self, zoom: u8) -> bool {
        zoom >= self.min_zoom() && zoom <= self.max_zoom()
    }
}
