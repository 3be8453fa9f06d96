//! Outbound HTTP retrieval.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::query::QueryParams;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Request cancelled")]
    Cancelled,

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Fetches an API URL and returns the body as text.
///
/// An empty body is returned as `Ok("")`; callers decide what it means.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_text(
        &self,
        url: &str,
        params: &QueryParams,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<String, FetchError>;
}

/// `reqwest`-backed fetcher shared by every provider.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(ssl_verify: bool) -> Result<Self, FetchError> {
        let client = Client::builder()
            .gzip(true)
            .danger_accept_invalid_certs(!ssl_verify)
            .user_agent(concat!("tvnab/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(
        &self,
        url: &str,
        params: &QueryParams,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<String, FetchError> {
        debug!(url = %url, params = %params.redacted(), "Fetching");

        let query: Vec<(&str, &str)> = params.iter().collect();
        let request = async {
            let response = self
                .client
                .get(url)
                .query(&query)
                .timeout(timeout)
                .send()
                .await
                .map_err(map_reqwest_error)?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }

            response.text().await.map_err(map_reqwest_error)
        };

        tokio::select! {
            result = request => result,
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
        }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::Connection(e.to_string())
    } else {
        FetchError::Client(e.to_string())
    }
}
