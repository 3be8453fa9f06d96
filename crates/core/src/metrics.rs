//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Outbound indexer traffic (caps and search calls)
//! - Result volume and skipped items per provider
//! - Catalog loading

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Indexer Traffic
// =============================================================================

/// Outbound indexer requests by provider, kind and result.
pub static PROVIDER_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tvnab_provider_requests_total",
            "Total outbound indexer requests",
        ),
        &["provider", "kind", "result"], // kind: "caps", "search"
    )
    .unwrap()
});

/// Outbound indexer request duration.
pub static PROVIDER_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "tvnab_provider_request_duration_seconds",
            "Duration of outbound indexer requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["kind"],
    )
    .unwrap()
});

// =============================================================================
// Results
// =============================================================================

/// Results returned per provider search.
pub static SEARCH_RESULTS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "tvnab_search_results",
            "Number of results returned per provider search",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0]),
        &["provider"],
    )
    .unwrap()
});

/// Items dropped because they could not be parsed.
pub static ITEMS_SKIPPED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tvnab_items_skipped_total", "Total unparseable result items"),
        &["provider"],
    )
    .unwrap()
});

// =============================================================================
// Catalog
// =============================================================================

/// Malformed provider records dropped while loading the catalog.
pub static CATALOG_RECORDS_SKIPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "tvnab_catalog_records_skipped_total",
        "Total malformed provider records skipped",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Count one outbound request.
pub fn record_request(provider: &str, kind: &str, result: &str) {
    PROVIDER_REQUESTS
        .with_label_values(&[provider, kind, result])
        .inc();
}

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(PROVIDER_REQUESTS.clone()),
        Box::new(PROVIDER_REQUEST_DURATION.clone()),
        Box::new(SEARCH_RESULTS.clone()),
        Box::new(ITEMS_SKIPPED.clone()),
        Box::new(CATALOG_RECORDS_SKIPPED.clone()),
    ]
}
