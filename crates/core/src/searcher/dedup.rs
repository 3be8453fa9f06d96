//! Deduplication and ranking of aggregated search results.

use std::collections::HashSet;

use super::SearchResult;

/// Drop results whose download URL was already seen.
///
/// The first occurrence wins and arrival order is kept.
pub fn deduplicate_results(raw: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen: HashSet<String> = HashSet::new();
    raw.into_iter()
        .filter(|r| seen.insert(r.download_url.clone()))
        .collect()
}

/// Deduplicate, then sort by seeders descending for torznab indexers.
///
/// Newznab results keep arrival order.
pub fn aggregate(raw: Vec<SearchResult>, torznab: bool) -> Vec<SearchResult> {
    let mut results = deduplicate_results(raw);
    if torznab {
        results.sort_by(|a, b| b.seeders.cmp(&a.seeders));
    }
    results
}
