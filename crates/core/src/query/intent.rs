use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What a search is looking for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchIntent {
    /// Latest releases, no target episode.
    Rss,
    /// A season pack.
    Season { season: u32 },
    /// One episode by scene season/episode number.
    Episode { season: u32, episode: u32 },
    /// A daily or sports episode keyed by air date.
    AirByDate { date: NaiveDate },
    /// An absolute-numbered (anime) episode.
    Absolute { number: u32 },
}

impl SearchIntent {
    pub fn is_rss(&self) -> bool {
        matches!(self, SearchIntent::Rss)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SearchIntent::Rss => "rss",
            SearchIntent::Season { .. } => "season",
            SearchIntent::Episode { .. } => "episode",
            SearchIntent::AirByDate { .. } => "air_by_date",
            SearchIntent::Absolute { .. } => "absolute",
        }
    }
}

impl fmt::Display for SearchIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchIntent::Rss => write!(f, "rss"),
            SearchIntent::Season { season } => write!(f, "season {}", season),
            SearchIntent::Episode { season, episode } => {
                write!(f, "S{:02}E{:02}", season, episode)
            }
            SearchIntent::AirByDate { date } => write!(f, "aired {}", date),
            SearchIntent::Absolute { number } => write!(f, "absolute {}", number),
        }
    }
}

/// Identity of the show being searched, supplied by the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowContext {
    /// External show id sent as `tvdbid`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvdbid: Option<u64>,
}

/// One search mode plus its free-text terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub intent: SearchIntent,
    #[serde(default)]
    pub terms: Vec<String>,
}

impl SearchRequest {
    pub fn new(intent: SearchIntent) -> Self {
        Self {
            intent,
            terms: Vec::new(),
        }
    }

    pub fn with_terms<I, S>(intent: SearchIntent, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            intent,
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }

    /// Terms with blanks and duplicates removed, first occurrence first.
    pub fn distinct_terms(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for term in self.terms.iter().map(|t| t.trim()) {
            if !term.is_empty() && !out.contains(&term) {
                out.push(term);
            }
        }
        out
    }
}
