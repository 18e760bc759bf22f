//! URL-template tile source.
//!
//! Covers the common XYZ tile servers (OSM-style, ArcGIS, most commercial
//! slippy-map endpoints). Supported placeholders:
//!
//! - `{z}` zoom level
//! - `{x}` column, west to east
//! - `{y}` row, north to south
//! - `{-y}` row in TMS order, south to north
//! - `{s}` subdomain, rotated across the configured list

use super::http::AsyncHttpClient;
use super::types::{ProviderError, TileSource};
use crate::coord::{TileAddress, MAX_ZOOM};

/// Checks that a template has a placeholder for every tile coordinate.
pub fn validate_template(template: &str) -> Result<(), ProviderError> {
    if !template.contains("{z}") {
        return Err(ProviderError::InvalidConfiguration(format!(
            "template '{}' is missing {{z}}",
            template
        )));
    }
    if !template.contains("{x}") {
        return Err(ProviderError::InvalidConfiguration(format!(
            "template '{}' is missing {{x}}",
            template
        )));
    }
    if !template.contains("{y}") && !template.contains("{-y}") {
        return Err(ProviderError::InvalidConfiguration(format!(
            "template '{}' is missing {{y}} or {{-y}}",
            template
        )));
    }
    Ok(())
}

/// Tile source that expands a URL template per tile.
///
/// # Example
///
/// ```no_run
/// use mapexport::provider::{AsyncReqwestClient, UrlTemplateSource};
///
/// let client = AsyncReqwestClient::new().unwrap();
/// let source = UrlTemplateSource::new(client, "topo", "https://{s}.tile.example.org/{z}/{x}/{y}.png")
///     .unwrap()
///     .with_zoom_range(0, 17);
/// ```
pub struct UrlTemplateSource<C: AsyncHttpClient> {
    http_client: C,
    name: String,
    template: String,
    subdomains: Vec<String>,
    min_zoom: u8,
    max_zoom: u8,
}

impl<C: AsyncHttpClient> UrlTemplateSource<C> {
    /// Creates a source for `template` covering zoom 0 through 19.
    pub fn new(
        http_client: C,
        name: impl Into<String>,
        template: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let template = template.into();
        validate_template(&template)?;

        Ok(Self {
            http_client,
            name: name.into(),
            template,
            subdomains: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            min_zoom: 0,
            max_zoom: 19,
        })
    }

    /// Sets the subdomains substituted for `{s}`.
    pub fn with_subdomains<I, S>(mut self, subdomains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let subdomains: Vec<String> = subdomains.into_iter().map(Into::into).collect();
        if !subdomains.is_empty() {
            self.subdomains = subdomains;
        }
        self
    }

    /// Sets the zoom range the server actually has imagery for.
    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom.min(MAX_ZOOM);
        self.max_zoom = max_zoom.clamp(self.min_zoom, MAX_ZOOM);
        self
    }

    /// Expands the template for one tile.
    pub fn build_url(&self, tile: TileAddress) -> String {
        let tms_row = tile
            .grid_size()
            .saturating_sub(1)
            .saturating_sub(u64::from(tile.row));
        let mut url = self
            .template
            .replace("{z}", &tile.zoom.to_string())
            .replace("{x}", &tile.col.to_string())
            .replace("{-y}", &tms_row.to_string())
            .replace("{y}", &tile.row.to_string());

        if url.contains("{s}") {
            let index = (tile.col as usize + tile.row as usize) % self.subdomains.len();
            url = url.replace("{s}", &self.subdomains[index]);
        }
        url
    }
}

impl<C: AsyncHttpClient> TileSource for UrlTemplateSource<C> {
    async fn fetch_tile(&self, tile: TileAddress) -> Result<Vec<u8>, ProviderError> {
        if !self.supports_zoom(tile.zoom) {
            return Err(ProviderError::UnsupportedZoom(tile.zoom));
        }

        let url = self.build_url(tile);
        let data = self.http_client.get(&url).await?;
        if data.is_empty() {
            return Err(ProviderError::NotFound);
        }
        Ok(data)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn min_zoom(&self) -> u8 {
        self.min_zoom
    }

    fn max_zoom(&self) -> u8 {
        self.max_zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::http::tests::MockAsyncHttpClient;

    fn source(template: &str) -> UrlTemplateSource<MockAsyncHttpClient> {
        UrlTemplateSource::new(MockAsyncHttpClient::new(Ok(vec![0xFF])), "test", template)
            .unwrap()
    }

    #[test]
    fn test_build_url_xyz() {
        let src = source("https://tiles.example.org/{z}/{x}/{y}.png");
        let url = src.build_url(TileAddress::new(10, 301, 384));
        assert_eq!(url, "https://tiles.example.org/10/301/384.png");
    }

    #[test]
    fn test_build_url_tms_row() {
        let src = source("https://tiles.example.org/{z}/{x}/{-y}.png");
        // 2^3 - 1 - 2 = 5
        let url = src.build_url(TileAddress::new(3, 1, 2));
        assert_eq!(url, "https://tiles.example.org/3/1/5.png");
    }

    #[test]
    fn test_build_url_rotates_subdomains() {
        let src = source("https://{s}.example.org/{z}/{x}/{y}")
            .with_subdomains(["one", "two"]);
        assert_eq!(
            src.build_url(TileAddress::new(4, 0, 0)),
            "https://one.example.org/4/0/0"
        );
        assert_eq!(
            src.build_url(TileAddress::new(4, 1, 0)),
            "https://two.example.org/4/1/0"
        );
    }

    #[test]
    fn test_empty_subdomain_list_keeps_default() {
        let src = source("https://{s}.example.org/{z}/{x}/{y}").with_subdomains(Vec::<String>::new());
        assert_eq!(
            src.build_url(TileAddress::new(1, 0, 0)),
            "https://a.example.org/1/0/0"
        );
    }

    #[test]
    fn test_validate_rejects_missing_placeholders() {
        assert!(validate_template("https://t/{x}/{y}").is_err());
        assert!(validate_template("https://t/{z}/{y}").is_err());
        assert!(validate_template("https://t/{z}/{x}").is_err());
    }

    #[test]
    fn test_zoom_range_is_clamped() {
        let src = source("https://t/{z}/{x}/{y}").with_zoom_range(5, 40);
        assert_eq!(src.min_zoom(), 5);
        assert_eq!(src.max_zoom(), MAX_ZOOM);

        let src = source("https://t/{z}/{x}/{y}").with_zoom_range(12, 3);
        assert_eq!(src.max_zoom(), 12);
    }

    #[tokio::test]
    async fn test_fetch_tile_requests_expanded_url() {
        let client = MockAsyncHttpClient::new(Ok(vec![1, 2, 3]));
        let src = UrlTemplateSource::new(client.clone(), "test", "https://t/{z}/{x}/{y}").unwrap();

        let data = src.fetch_tile(TileAddress::new(2, 1, 3)).await.unwrap();
        assert_eq!(data, vec![1, 2, 3]);
        assert_eq!(client.requested(), vec!["https://t/2/1/3".to_string()]);
    }

    #[tokio::test]
    async fn test_fetch_tile_unsupported_zoom() {
        let src = source("https://t/{z}/{x}/{y}").with_zoom_range(0, 10);
        let err = src.fetch_tile(TileAddress::new(12, 0, 0)).await.unwrap_err();
        assert_eq!(err, ProviderError::UnsupportedZoom(12));
    }

    #[tokio::test]
    async fn test_empty_body_means_no_tile() {
        let src = UrlTemplateSource::new(
            MockAsyncHttpClient::new(Ok(Vec::new())),
            "test",
            "https://t/{z}/{x}/{y}",
        )
        .unwrap();
        let err = src.fetch_tile(TileAddress::new(1, 0, 0)).await.unwrap_err();
        assert_eq!(err, ProviderError::NotFound);
    }
}
