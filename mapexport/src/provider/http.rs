//! HTTP client abstraction for testability

use super::types::ProviderError;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Default per-request timeout applied by the client itself.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// User-Agent sent with every request. Some tile servers reject anonymous clients.
const DEFAULT_USER_AGENT: &str = concat!("mapexport/", env!("CARGO_PKG_VERSION"));

/// Trait for asynchronous HTTP client operations.
///
/// Allows tile sources to be exercised against a mock client in tests.
pub trait AsyncHttpClient: Send + Sync + 'static {
    /// Performs an async HTTP GET request and returns the response body.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;
}

/// Maps a non-success HTTP status onto a provider error.
///
/// 404 and 204 mean the tile lies outside the source's coverage. 429 and
/// server errors are transient. Any other client error is permanent.
pub fn classify_status(status: u16, url: &str) -> ProviderError {
    match status {
        204 | 404 => ProviderError::NotFound,
        429 => ProviderError::Throttled(url.to_string()),
        408 => ProviderError::Timeout,
        500..=599 => ProviderError::HttpError(format!("HTTP {} from {}", status, url)),
        _ => ProviderError::Rejected {
            status,
            url: url.to_string(),
        },
    }
}

/// Async HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a client with the default timeout.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT_SECS)
    }

    /// Creates a client with a custom timeout.
    ///
    /// Keeps a large idle pool since exports hit one host with many parallel requests.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(DEFAULT_USER_AGENT)
            .pool_max_idle_per_host(64)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                ProviderError::InvalidConfiguration(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        trace!(url = url, "HTTP GET request starting");

        let response = match self.client.get(url).send().await {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                if e.is_timeout() {
                    return Err(ProviderError::Timeout);
                }
                return Err(ProviderError::HttpError(format!("request failed: {}", e)));
            }
        };

        let status = response.status();
        if !status.is_success() || status.as_u16() == 204 {
            return Err(classify_status(status.as_u16(), url));
        }

        match response.bytes().await {
            Ok(bytes) => {
                trace!(url = url, bytes = bytes.len(), "HTTP response body read");
                Ok(bytes.to_vec())
            }
            Err(e) => {
                warn!(url = url, error = %e, "Failed to read response body");
                Err(ProviderError::HttpError(format!(
                    "failed to read response: {}",
                    e
                )))
            }
        }
    }
}
