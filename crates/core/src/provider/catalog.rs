//! Reconciling the shipped default catalog with user provider configuration.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::record::RECORD_SEPARATOR;
use super::types::{is_tv_category, ProviderRecord};
use crate::metrics;

/// Indexers shipped with the application, in display order.
pub const DEFAULT_CATALOG: &str = concat!(
    "NZB.Cat|https://nzb.cat/||5030,5040,5010|0|episode|1|1|1!!!",
    "NZBFinder.ws|https://nzbfinder.ws/||5030,5040,5010,5045|0|episode|1|1|1!!!",
    "NZBGeek|https://api.nzbgeek.info/||5030,5040|0|episode|0|0|0!!!",
    "Usenet-Crawler|https://www.usenet-crawler.com/||5030,5040|0|episode|0|0|0!!!",
    "DOGnzb|https://api.dognzb.cr/||5030,5040,5060,5070|0|episode|0|1|1",
);

/// Decode a `!!!`-joined catalog string.
///
/// Malformed records are logged and skipped. Duplicate names keep the first
/// occurrence.
pub fn parse_catalog(source: &str) -> Vec<ProviderRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for raw in source
        .split(RECORD_SEPARATOR)
        .map(str::trim)
        .filter(|r| !r.is_empty())
    {
        match ProviderRecord::from_config_string(raw) {
            Ok(record) => {
                if seen.insert(record.name.clone()) {
                    records.push(record);
                } else {
                    debug!(provider = %record.name, "Dropping duplicate provider record");
                }
            }
            Err(e) => {
                warn!(record = %raw, error = %e, "Skipping provider record, incorrect format");
                metrics::CATALOG_RECORDS_SKIPPED.inc();
            }
        }
    }

    records
}

/// Merge the default catalog into the user's configured providers.
///
/// User records come first in their configured order, followed by every
/// default whose name the user list does not contain.
pub fn merge(default_source: &str, user_source: &str) -> Vec<ProviderRecord> {
    merge_with_prior(default_source, user_source, &[])
}

/// Like [`merge`], but category narrowing recorded for an absent default in a
/// previous merge (`prior`) survives into the re-inserted default.
pub fn merge_with_prior(
    default_source: &str,
    user_source: &str,
    prior: &[ProviderRecord],
) -> Vec<ProviderRecord> {
    let defaults = parse_catalog(default_source);
    let user = parse_catalog(user_source);

    let user_names: HashSet<&str> = user.iter().map(|r| r.name.as_str()).collect();

    let mut merged: Vec<ProviderRecord> = user
        .iter()
        .map(|record| {
            let tracks_default = defaults
                .iter()
                .any(|d| d.name == record.name && d.url == record.url);
            ProviderRecord {
                is_default: tracks_default,
                ..record.clone()
            }
        })
        .collect();

    for default in defaults
        .iter()
        .filter(|d| !user_names.contains(d.name.as_str()))
    {
        let previous = prior.iter().find(|p| p.name == default.name);
        merged.push(overlay_default(default, previous));
    }

    merged
}

/// Build the record inserted for a default the user list does not mention.
///
/// Connection, auth and schedule fields come from the default unconditionally;
/// categories come from the previous record when it still has TV-band codes.
fn overlay_default(default: &ProviderRecord, previous: Option<&ProviderRecord>) -> ProviderRecord {
    let categories = previous
        .map(|p| {
            p.categories
                .iter()
                .copied()
                .filter(|c| is_tv_category(*c))
                .collect::<Vec<_>>()
        })
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| default.categories.clone());

    ProviderRecord {
        categories,
        is_default: true,
        ..default.clone()
    }
}

/// The merged provider list, remembered across reloads.
#[derive(Debug, Clone, Default)]
pub struct ProviderCatalog {
    records: Vec<ProviderRecord>,
}

impl ProviderCatalog {
    /// First load: merge with no previous state.
    pub fn load(default_source: &str, user_source: &str) -> Self {
        Self {
            records: merge(default_source, user_source),
        }
    }

    /// Re-merge, carrying this catalog's records as the previous state.
    pub fn reload(&mut self, default_source: &str, user_source: &str) {
        self.records = merge_with_prior(default_source, user_source, &self.records);
    }

    pub fn records(&self) -> &[ProviderRecord] {
        &self.records
    }

    pub fn get(&self, name: &str) -> Option<&ProviderRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn into_records(self) -> Vec<ProviderRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::serialize_catalog;

    fn names(records: &[ProviderRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_parse_default_catalog() {
        let defaults = parse_catalog(DEFAULT_CATALOG);
        assert_eq!(
            names(&defaults),
            vec!["NZB.Cat", "NZBFinder.ws", "NZBGeek", "Usenet-Crawler", "DOGnzb"]
        );
        assert!(defaults.iter().all(|d| d.is_key_missing()));
    }

    #[test]
    fn test_parse_catalog_skips_malformed_and_duplicates() {
        let source = "A|https://a.example/|0|5030|1!!!broken!!!A|https://other.example/|0|5040|1!!!B|https://b.example/|0|5040|0";
        let records = parse_catalog(source);
        assert_eq!(names(&records), vec!["A", "B"]);
        assert_eq!(records[0].url, "https://a.example/");
    }

    #[test]
    fn test_merge_empty_user_yields_defaults() {
        let merged = merge(DEFAULT_CATALOG, "");
        assert_eq!(merged.len(), 5);
        assert!(merged.iter().all(|r| r.is_default));
        assert_eq!(merged[4].categories, vec![5030, 5040, 5060, 5070]);
    }

    #[test]
    fn test_merge_user_first_then_defaults() {
        let user = "Mine|https://mine.example/|key|5030|1!!!NZBGeek|https://api.nzbgeek.info/|geekkey|5040|1|season|0|1|0";
        let merged = merge(DEFAULT_CATALOG, user);

        assert_eq!(
            names(&merged),
            vec!["Mine", "NZBGeek", "NZB.Cat", "NZBFinder.ws", "Usenet-Crawler", "DOGnzb"]
        );
        assert!(!merged[0].is_default);

        // The user's NZBGeek wins over the shipped one
        let geek = &merged[1];
        assert_eq!(geek.api_key, "geekkey");
        assert_eq!(geek.categories, vec![5040]);
        assert_eq!(geek.search_mode, crate::provider::SearchMode::Season);
        assert!(geek.is_default);
    }

    #[test]
    fn test_merge_user_override_with_different_url_is_not_default() {
        let user = "NZBGeek|https://mirror.example/|key|5040|1";
        let merged = merge(DEFAULT_CATALOG, user);
        assert_eq!(merged.iter().filter(|r| r.name == "NZBGeek").count(), 1);
        assert!(!merged[0].is_default);
    }

    #[test]
    fn test_merge_malformed_user_entry_falls_back_to_default() {
        let user = "NZBGeek|https://api.nzbgeek.info/";
        let merged = merge(DEFAULT_CATALOG, user);
        let geek = merged.iter().find(|r| r.name == "NZBGeek").unwrap();
        assert!(geek.is_default);
        assert!(geek.api_key.is_empty());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let user = "Mine|https://mine.example/|key|5030,2000|1!!!DOGnzb|https://api.dognzb.cr/|k|5070|1|episode|0|1|1";
        let first = merge(DEFAULT_CATALOG, user);
        let second = merge(DEFAULT_CATALOG, &serialize_catalog(&first));
        assert_eq!(first, second);
    }

    #[test]
    fn test_merge_categories_always_in_tv_band() {
        let user = "Mine|https://mine.example/|key|2000,5030,8010|1";
        let merged = merge(DEFAULT_CATALOG, user);
        assert!(merged
            .iter()
            .all(|r| r.categories.iter().all(|c| is_tv_category(*c))));
    }

    #[test]
    fn test_merge_with_prior_keeps_category_narrowing() {
        let mut prior = parse_catalog(DEFAULT_CATALOG);
        for p in prior.iter_mut() {
            if p.name == "NZB.Cat" {
                p.categories = vec![5040, 2000];
            }
            if p.name == "NZBGeek" {
                p.categories = vec![2000];
            }
        }

        let merged = merge_with_prior(DEFAULT_CATALOG, "", &prior);
        let cat = merged.iter().find(|r| r.name == "NZB.Cat").unwrap();
        assert_eq!(cat.categories, vec![5040]);

        // No TV codes left: the default's own categories are used
        let geek = merged.iter().find(|r| r.name == "NZBGeek").unwrap();
        assert_eq!(geek.categories, vec![5030, 5040]);
    }

    #[test]
    fn test_provider_catalog_reload() {
        let mut catalog = ProviderCatalog::load(DEFAULT_CATALOG, "Mine|https://mine.example/|0|5030|1");
        assert_eq!(catalog.records().len(), 6);
        assert!(catalog.get("Mine").is_some());

        catalog.reload(DEFAULT_CATALOG, "");
        assert_eq!(catalog.records().len(), 5);
        assert!(catalog.get("Mine").is_none());
    }
}
