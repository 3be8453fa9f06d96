use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

use crate::searcher::LoadPreset;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Settings consumed by every provider search.
///
/// Handed to the query builder, the pacing gate and the fetcher as a value;
/// nothing in the core reads these from global state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchSettings {
    /// Retention window sent as `maxage`.
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,
    /// Delay applied before each outbound search call.
    #[serde(default)]
    pub load_preset: LoadPreset,
    /// Send `tvdbid` when the indexer advertises it.
    #[serde(default = "default_true")]
    pub use_identity_search: bool,
    /// Verify TLS certificates of indexers.
    #[serde(default = "default_true")]
    pub ssl_verify: bool,
    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl SearchSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_age_days: default_max_age_days(),
            load_preset: LoadPreset::default(),
            use_identity_search: true,
            ssl_verify: true,
            request_timeout_secs: default_timeout(),
        }
    }
}

fn default_max_age_days() -> u32 {
    500
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

/// Persisted provider configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProvidersConfig {
    /// User provider records in the `!!!`-joined pipe format.
    #[serde(default)]
    pub custom: String,
    /// Replaces the shipped default catalog when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_catalog: Option<String>,
}

/// Sanitized config for API responses (provider keys are never echoed)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub search: SearchSettings,
    pub providers: SanitizedProvidersConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedProvidersConfig {
    /// Number of non-empty user records in the persisted string.
    pub providers_configured: usize,
    pub custom_default_catalog: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            search: config.search.clone(),
            providers: SanitizedProvidersConfig {
                providers_configured: config
                    .providers
                    .custom
                    .split(crate::provider::RECORD_SEPARATOR)
                    .filter(|r| !r.trim().is_empty())
                    .count(),
                custom_default_catalog: config.providers.default_catalog.is_some(),
            },
        }
    }
}
