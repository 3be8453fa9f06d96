use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Parameters assumed when `tv-search` omits `supportedParams`.
pub const DEFAULT_TV_SEARCH_PARAMS: &str = "tvdbid,season,ep";

/// What an indexer's API accepts, as learned from `t=caps`.
///
/// `discovered` stays false until a negotiation succeeds; callers must check
/// it rather than inferring anything from the other fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub supports_tv_search: bool,
    /// Lowercased names from `supportedParams`. Empty when tv-search is off.
    pub supported_params: BTreeSet<String>,
    pub torznab: bool,
    /// tv-search takes the free-text term only; no identity or numbering.
    #[serde(default)]
    pub free_text_only: bool,
    pub discovered: bool,
}

impl Capabilities {
    pub fn undiscovered() -> Self {
        Self::default()
    }

    /// Capabilities with tv-search on and the given accepted parameters.
    pub fn tv_search<'a>(params: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            supports_tv_search: true,
            supported_params: params
                .into_iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            torznab: false,
            free_text_only: false,
            discovered: true,
        }
    }

    /// tv-search that accepts nothing but `q`.
    pub fn free_text() -> Self {
        Self {
            free_text_only: true,
            ..Self::tv_search([])
        }
    }

    /// Discovered capabilities for an endpoint that only does plain `t=search`.
    pub fn search_only() -> Self {
        Self {
            discovered: true,
            ..Self::default()
        }
    }

    pub fn supports_param(&self, name: &str) -> bool {
        self.supports_tv_search && self.supported_params.contains(name)
    }
}

/// A TV category advertised by the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TvCategory {
    pub id: String,
    pub name: String,
}

/// Result of a successful negotiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Negotiation {
    pub capabilities: Capabilities,
    /// TV categories and their subcategories, for configuration screens.
    pub categories: Vec<TvCategory>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undiscovered_is_empty() {
        let caps = Capabilities::undiscovered();
        assert!(!caps.discovered);
        assert!(!caps.supports_tv_search);
        assert!(caps.supported_params.is_empty());
    }

    #[test]
    fn test_tv_search_normalizes_params() {
        let caps = Capabilities::tv_search(["q", " TVDBID ", "", "season"]);
        assert!(caps.discovered);
        assert!(caps.supports_param("tvdbid"));
        assert!(caps.supports_param("season"));
        assert!(!caps.supports_param("ep"));
        assert_eq!(caps.supported_params.len(), 3);
    }

    #[test]
    fn test_search_only_supports_nothing() {
        let caps = Capabilities::search_only();
        assert!(caps.discovered);
        assert!(!caps.supports_param("q"));
    }
}
