//! Tile source abstraction
//!
//! A [`TileSource`] turns a [`TileAddress`](crate::coord::TileAddress) into
//! encoded image bytes. The stock implementation is [`UrlTemplateSource`],
//! which expands an XYZ URL template and downloads through an
//! [`AsyncHttpClient`]. Sources can be stacked with [`SourceChain`] so gaps
//! in one layer fall back to the next.
//!
//! ```no_run
//! use mapexport::provider::{AsyncReqwestClient, UrlTemplateSource};
//!
//! let client = AsyncReqwestClient::new().unwrap();
//! let source =
//!     UrlTemplateSource::new(client, "osm", "https://tile.openstreetmap.org/{z}/{x}/{y}.png").unwrap();
//! # let _ = source;
//! ```

mod chain;
mod http;
mod template;
mod types;

pub use chain::SourceChain;
pub use http::{classify_status, AsyncHttpClient, AsyncReqwestClient, DEFAULT_HTTP_TIMEOUT_SECS};
pub use template::{validate_template, UrlTemplateSource};
pub use types::{ProviderError, TileSource};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
