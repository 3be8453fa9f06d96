//! Types for the provider search system.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::caps::NegotiationError;

/// One release returned by an indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    /// NZB or torrent URL. Results are deduplicated on this.
    pub download_url: String,
    /// Size in bytes, -1 if unknown.
    pub size: i64,
    /// Seeders, 0 unless the indexer is torznab-flavored.
    pub seeders: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<DateTime<Utc>>,
    /// Provider that returned this result.
    pub provider: String,
}

/// Cancellation and deadline for one search invocation.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    pub cancel: CancellationToken,
    pub deadline: Option<Instant>,
}

impl SearchContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn with_cancel(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    /// Cancelled, or past the deadline.
    pub fn is_done(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// `timeout`, shortened so it never runs past the deadline.
    pub fn bound(&self, timeout: Duration) -> Duration {
        match self.deadline {
            Some(deadline) => timeout.min(deadline.saturating_duration_since(Instant::now())),
            None => timeout,
        }
    }
}

/// Why a provider's search produced nothing (or stopped early).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("API key required but not configured for {0}")]
    AuthConfig(String),

    #[error("Capability negotiation failed: {0}")]
    Negotiation(NegotiationError),

    #[error("Request failed: {0}")]
    Fetch(String),

    #[error("Indexer reported an error: {0}")]
    ProviderReported(String),

    #[error("Search cancelled")]
    Cancelled,

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Provider disabled: {0}")]
    ProviderDisabled(String),
}

impl From<NegotiationError> for SearchError {
    fn from(e: NegotiationError) -> Self {
        match e {
            NegotiationError::AuthConfig(name) => SearchError::AuthConfig(name),
            NegotiationError::Cancelled => SearchError::Cancelled,
            other => SearchError::Negotiation(other),
        }
    }
}

/// Result of searching one provider.
///
/// `results` holds everything gathered before any failure; a `failure` does
/// not invalidate them.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub provider: String,
    pub results: Vec<SearchResult>,
    pub failure: Option<SearchError>,
    pub requests_made: usize,
}

impl SearchOutcome {
    pub fn failed(provider: &str, error: SearchError) -> Self {
        Self {
            provider: provider.to_string(),
            results: Vec::new(),
            failure: Some(error),
            requests_made: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Result of a sweep over several providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResult {
    /// Per-provider results, keyed by provider name.
    pub results: HashMap<String, Vec<SearchResult>>,
    /// Providers that failed (name -> error message).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub provider_errors: HashMap<String, String>,
    /// How long the sweep took in milliseconds.
    pub duration_ms: u64,
}

impl SweepResult {
    pub fn total_results(&self) -> usize {
        self.results.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_serialization() {
        let result = SearchResult {
            title: "Show.S02E05.720p".to_string(),
            download_url: "https://nzb.cat/getnzb/1.nzb".to_string(),
            size: -1,
            seeders: 0,
            publish_date: None,
            provider: "NZB.Cat".to_string(),
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("publish_date"));

        let parsed: SearchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_sweep_result_skips_empty_errors() {
        let sweep = SweepResult {
            results: HashMap::new(),
            provider_errors: HashMap::new(),
            duration_ms: 12,
        };
        let json = serde_json::to_string(&sweep).unwrap();
        assert!(!json.contains("provider_errors"));
        assert_eq!(sweep.total_results(), 0);
    }

    #[test]
    fn test_negotiation_auth_error_maps_to_auth_config() {
        let err: SearchError = NegotiationError::AuthConfig("x".to_string()).into();
        assert_eq!(err, SearchError::AuthConfig("x".to_string()));

        let err: SearchError = NegotiationError::Parse("bad".to_string()).into();
        assert!(matches!(err, SearchError::Negotiation(_)));
    }

    #[test]
    fn test_context_bound_respects_deadline() {
        let ctx = SearchContext::with_timeout(Duration::from_secs(2));
        assert!(ctx.bound(Duration::from_secs(30)) <= Duration::from_secs(2));
        assert_eq!(
            SearchContext::new().bound(Duration::from_secs(30)),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_context_done_when_cancelled() {
        let ctx = SearchContext::new();
        assert!(!ctx.is_done());
        ctx.cancel.cancel();
        assert!(ctx.is_done());
    }
}
