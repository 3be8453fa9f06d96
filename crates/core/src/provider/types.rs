//! Provider record types.

use serde::{Deserialize, Serialize};

/// Lowest category code of the TV band.
pub const TV_CATEGORY_MIN: u32 = 5000;
/// Highest category code of the TV band.
pub const TV_CATEGORY_MAX: u32 = 5999;
/// Categories used when a record ends up with none in the TV band.
pub const DEFAULT_CATEGORIES: [u32; 2] = [5030, 5040];
/// API key value meaning "this indexer needs no key".
pub const NO_KEY_SENTINEL: &str = "0";

/// How the scheduler should search this provider for backlog items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// One request per wanted episode.
    #[default]
    Episode,
    /// Season packs first.
    Season,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Episode => "episode",
            SearchMode::Season => "season",
        }
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SearchMode {
    type Err = String;

    /// Accepts the legacy `sponly`/`eponly` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "episode" | "eponly" => Ok(SearchMode::Episode),
            "season" | "sponly" => Ok(SearchMode::Season),
            other => Err(other.to_string()),
        }
    }
}

/// Configuration for one Newznab-compatible indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRecord {
    /// Unique key across the catalog.
    pub name: String,
    pub url: String,
    /// `"0"` when no key is required, empty when a key is required but unset.
    pub api_key: String,
    /// Ordered, deduplicated, always inside the TV band.
    pub categories: Vec<u32>,
    pub enabled: bool,
    pub search_mode: SearchMode,
    pub search_fallback: bool,
    pub enable_daily: bool,
    pub enable_backlog: bool,
    /// Sourced from the shipped catalog and not pointed elsewhere by the user.
    pub is_default: bool,
}

impl ProviderRecord {
    /// A disabled record with the same defaults a freshly added indexer gets.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            api_key: NO_KEY_SENTINEL.to_string(),
            categories: DEFAULT_CATEGORIES.to_vec(),
            enabled: false,
            search_mode: SearchMode::Episode,
            search_fallback: false,
            enable_daily: true,
            enable_backlog: false,
            is_default: false,
        }
    }

    /// A key other than the no-key sentinel has been configured.
    pub fn needs_auth(&self) -> bool {
        self.api_key != NO_KEY_SENTINEL && !self.api_key.is_empty()
    }

    pub fn is_public(&self) -> bool {
        !self.needs_auth()
    }

    /// An empty key means the indexer requires one the user has not entered.
    pub fn is_key_missing(&self) -> bool {
        self.api_key.trim().is_empty()
    }

    /// Categories joined with `,`, or the default pair when none are set.
    pub fn categories_param(&self) -> String {
        let cats = if self.categories.is_empty() {
            &DEFAULT_CATEGORIES[..]
        } else {
            &self.categories[..]
        };
        join_categories(cats)
    }
}

pub fn is_tv_category(code: u32) -> bool {
    (TV_CATEGORY_MIN..=TV_CATEGORY_MAX).contains(&code)
}

/// Parse a comma separated category list, keeping TV-band codes only.
///
/// Order is preserved and duplicates are dropped. Non-numeric tokens are ignored.
pub fn parse_tv_categories(raw: &str) -> Vec<u32> {
    let mut out = Vec::new();
    for code in raw
        .split(',')
        .filter_map(|token| token.trim().parse::<u32>().ok())
        .filter(|code| is_tv_category(*code))
    {
        if !out.contains(&code) {
            out.push(code);
        }
    }
    out
}

pub fn join_categories(categories: &[u32]) -> String {
    categories
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_auth() {
        let mut record = ProviderRecord::new("Test", "https://test.example/");
        assert!(!record.needs_auth());
        assert!(record.is_public());
        assert!(!record.is_key_missing());

        record.api_key = "abc123".to_string();
        assert!(record.needs_auth());
        assert!(!record.is_public());

        record.api_key = String::new();
        assert!(!record.needs_auth());
        assert!(record.is_key_missing());
    }

    #[test]
    fn test_search_mode_aliases() {
        assert_eq!("sponly".parse::<SearchMode>().unwrap(), SearchMode::Season);
        assert_eq!("eponly".parse::<SearchMode>().unwrap(), SearchMode::Episode);
        assert_eq!("Season".parse::<SearchMode>().unwrap(), SearchMode::Season);
        assert!("weekly".parse::<SearchMode>().is_err());
    }

    #[test]
    fn test_parse_tv_categories_filters_band() {
        assert_eq!(
            parse_tv_categories("5030, 2000,5040,abc,5030,6000,5999"),
            vec![5030, 5040, 5999]
        );
        assert!(parse_tv_categories("").is_empty());
    }

    #[test]
    fn test_categories_param_fallback() {
        let mut record = ProviderRecord::new("Test", "https://test.example/");
        record.categories.clear();
        assert_eq!(record.categories_param(), "5030,5040");

        record.categories = vec![5070];
        assert_eq!(record.categories_param(), "5070");
    }

    #[test]
    fn test_search_mode_serialization() {
        assert_eq!(
            serde_json::to_string(&SearchMode::Season).unwrap(),
            "\"season\""
        );
    }
}
