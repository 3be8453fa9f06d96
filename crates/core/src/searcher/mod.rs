//! Provider search.
//!
//! `NewznabSearcher` searches one indexer: it ensures capabilities, builds
//! one request per distinct term, paces each call and validates each
//! response. `ProviderPool` fans a search out across every enabled provider.

mod dedup;
mod fetch;
mod newznab;
mod pacing;
mod pool;
mod response;
mod types;

pub use dedup::{aggregate, deduplicate_results};
pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use newznab::NewznabSearcher;
pub use pacing::{LoadPreset, PacingGate};
pub use pool::ProviderPool;
pub use response::{parse_item, validate_and_parse, ItemError, ParsedResponse, ResponseError};
pub use types::*;
