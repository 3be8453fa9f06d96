pub mod caps;
pub mod config;
pub mod metrics;
pub mod provider;
pub mod query;
pub mod searcher;
pub mod testing;
pub mod xml;

pub use caps::{Capabilities, CapabilityCache, Negotiation, NegotiationError, TvCategory};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ProvidersConfig,
    SanitizedConfig, SearchSettings, ServerConfig,
};
pub use provider::{merge, ProviderCatalog, ProviderRecord, SearchMode, DEFAULT_CATALOG};
pub use query::{SearchIntent, SearchRequest, ShowContext};
pub use searcher::{
    Fetcher, HttpFetcher, LoadPreset, NewznabSearcher, ProviderPool, SearchContext, SearchError,
    SearchOutcome, SearchResult, SweepResult,
};
