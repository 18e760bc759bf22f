//! Fallback chain of tile sources.

use super::types::{ProviderError, TileSource};
use crate::coord::TileAddress;
use tracing::trace;

/// Tries each source in order until one returns imagery.
///
/// A source that has no tile at an address, or does not serve its zoom, is
/// skipped. Any other error stops the chain and is returned as is, so a
/// transient failure gets retried by the caller against the whole chain.
pub struct SourceChain<S: TileSource> {
    name: String,
    sources: Vec<S>,
}

impl<S: TileSource> SourceChain<S> {
    /// Creates a chain. Sources are consulted in the given order.
    pub fn new(sources: Vec<S>) -> Self {
        let name = sources
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join("+");
        Self { name, sources }
    }

    /// Number of sources in the chain.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl<S: TileSource> TileSource for SourceChain<S> {
    async fn fetch_tile(&self, tile: TileAddress) -> Result<Vec<u8>, ProviderError> {
        for source in self.sources.iter().filter(|s| s.supports_zoom(tile.zoom)) {
            match source.fetch_tile(tile).await {
                Ok(data) => return Ok(data),
                Err(ProviderError::NotFound) | Err(ProviderError::UnsupportedZoom(_)) => {
                    trace!(source = source.name(), tile = %tile, "no tile, trying next source");
                }
                Err(e) => return Err(e),
            }
        }
        Err(ProviderError::NotFound)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn min_zoom(&self) -> u8 {
        self.sources.iter().map(|s| s.min_zoom()).min().unwrap_or(0)
    }

    fn max_zoom(&self) -> u8 {
        self.sources.iter().map(|s| s.max_zoom()).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::http::tests::MockAsyncHttpClient;
    use crate::provider::UrlTemplateSource;

    fn source(
        name: &str,
        response: Result<Vec<u8>, ProviderError>,
    ) -> (UrlTemplateSource<MockAsyncHttpClient>, MockAsyncHttpClient) {
        let client = MockAsyncHttpClient::new(response);
        let src = UrlTemplateSource::new(
            client.clone(),
            name,
            format!("https://{}/{{z}}/{{x}}/{{y}}", name),
        )
        .unwrap();
        (src, client)
    }

    #[tokio::test]
    async fn test_falls_through_missing_tiles() {
        let (first, first_client) = source("first", Err(ProviderError::NotFound));
        let (second, _) = source("second", Ok(vec![7]));
        let chain = SourceChain::new(vec![first, second]);

        let data = chain.fetch_tile(TileAddress::new(3, 1, 1)).await.unwrap();
        assert_eq!(data, vec![7]);
        assert_eq!(first_client.requested().len(), 1);
        assert_eq!(chain.name(), "first+second");
    }

    #[tokio::test]
    async fn test_skips_sources_without_zoom() {
        let (first, first_client) = source("first", Ok(vec![1]));
        let first = first.with_zoom_range(0, 5);
        let (second, _) = source("second", Ok(vec![2]));
        let chain = SourceChain::new(vec![first, second]);

        let data = chain.fetch_tile(TileAddress::new(9, 0, 0)).await.unwrap();
        assert_eq!(data, vec![2]);
        assert!(first_client.requested().is_empty());
    }

    #[tokio::test]
    async fn test_transient_error_stops_chain() {
        let (first, _) = source("first", Err(ProviderError::Timeout));
        let (second, second_client) = source("second", Ok(vec![2]));
        let chain = SourceChain::new(vec![first, second]);

        let err = chain.fetch_tile(TileAddress::new(2, 0, 0)).await.unwrap_err();
        assert_eq!(err, ProviderError::Timeout);
        assert!(second_client.requested().is_empty());
    }

    #[tokio::test]
    async fn test_exhausted_chain_is_not_found() {
        let (first, _) = source("first", Err(ProviderError::NotFound));
        let chain = SourceChain::new(vec![first]);
        let err = chain.fetch_tile(TileAddress::new(2, 0, 0)).await.unwrap_err();
        assert_eq!(err, ProviderError::NotFound);
    }

    #[test]
    fn test_zoom_span_covers_all_sources() {
        let (a, _) = source("a", Ok(vec![]));
        let (b, _) = source("b", Ok(vec![]));
        let chain = SourceChain::new(vec![a.with_zoom_range(3, 10), b.with_zoom_range(6, 17)]);
        assert_eq!(chain.min_zoom(), 3);
        assert_eq!(chain.max_zoom(), 17);
        assert_eq!(chain.len(), 2);
    }
}
