//! Mock fetcher for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::query::QueryParams;
use crate::searcher::{FetchError, Fetcher};

/// A recorded request for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub params: QueryParams,
    pub timeout: Duration,
}

/// A request handler that produces responses dynamically.
type RequestHandler = Box<dyn Fn(&str, &QueryParams) -> Result<String, FetchError> + Send + Sync>;

/// Mock implementation of the Fetcher trait.
///
/// Responses are served in this order:
/// - scripted responses, first in first out
/// - the handler, if one is set
/// - otherwise an empty body
///
/// # Example
///
/// ```rust,ignore
/// use tvnab_core::testing::{fixtures, MockFetcher};
///
/// let fetcher = MockFetcher::new();
/// fetcher.push_response(fixtures::NEWZNAB_CAPS).await;
/// fetcher.push_response(fixtures::NEWZNAB_RESULTS).await;
///
/// // ... run a search ...
///
/// let requests = fetcher.requests().await;
/// assert_eq!(requests[0].params.get("t"), Some("caps"));
/// ```
#[derive(Clone, Default)]
pub struct MockFetcher {
    responses: Arc<RwLock<VecDeque<Result<String, FetchError>>>>,
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
    handler: Arc<RwLock<Option<RequestHandler>>>,
    delay: Arc<RwLock<Option<Duration>>>,
}

impl std::fmt::Debug for MockFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockFetcher")
            .field("responses", &"<responses>")
            .field("requests", &"<requests>")
            .field("handler", &"<handler>")
            .finish()
    }
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response body.
    pub async fn push_response(&self, body: &str) {
        self.responses.write().await.push_back(Ok(body.to_string()));
    }

    /// Queue a transport failure.
    pub async fn push_error(&self, error: FetchError) {
        self.responses.write().await.push_back(Err(error));
    }

    /// Answer requests not covered by scripted responses.
    pub async fn set_handler<F>(&self, handler: F)
    where
        F: Fn(&str, &QueryParams) -> Result<String, FetchError> + Send + Sync + 'static,
    {
        *self.handler.write().await = Some(Box::new(handler));
    }

    /// Delay every response. A delay past the request timeout fails with
    /// `Timeout`; cancellation still wins.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    pub async fn clear(&self) {
        self.requests.write().await.clear();
        self.responses.write().await.clear();
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch_text(
        &self,
        url: &str,
        params: &QueryParams,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<String, FetchError> {
        self.requests.write().await.push(RecordedRequest {
            url: url.to_string(),
            params: params.clone(),
            timeout,
        });

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::select! {
                _ = tokio::time::sleep(delay.min(timeout)) => {}
                _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            }
            if delay > timeout {
                return Err(FetchError::Timeout);
            }
        }

        if let Some(response) = self.responses.write().await.pop_front() {
            return response;
        }

        match self.handler.read().await.as_ref() {
            Some(handler) => handler(url, params),
            None => Ok(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_then_handler_then_empty() {
        let fetcher = MockFetcher::new();
        let cancel = CancellationToken::new();
        let params = QueryParams::new();
        let timeout = Duration::from_secs(1);

        fetcher.push_response("first").await;
        assert_eq!(fetcher.fetch_text("u", &params, timeout, &cancel).await.unwrap(), "first");
        assert_eq!(fetcher.fetch_text("u", &params, timeout, &cancel).await.unwrap(), "");

        fetcher.set_handler(|url, _| Ok(format!("from {}", url))).await;
        assert_eq!(
            fetcher.fetch_text("h", &params, timeout, &cancel).await.unwrap(),
            "from h"
        );
        assert_eq!(fetcher.request_count().await, 3);
    }

    #[tokio::test]
    async fn test_delay_honors_cancellation() {
        let fetcher = MockFetcher::new();
        fetcher.set_delay(Duration::from_secs(60)).await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = fetcher
            .fetch_text("u", &QueryParams::new(), Duration::from_secs(1), &cancel)
            .await;
        assert_eq!(result, Err(FetchError::Cancelled));
    }

    #[tokio::test]
    async fn test_delay_past_timeout_times_out() {
        let fetcher = MockFetcher::new();
        fetcher.set_delay(Duration::from_secs(60)).await;

        let result = fetcher
            .fetch_text(
                "u",
                &QueryParams::new(),
                Duration::from_millis(10),
                &CancellationToken::new(),
            )
            .await;
        assert_eq!(result, Err(FetchError::Timeout));
    }
}
