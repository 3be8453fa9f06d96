use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;
use tvnab_core::{
    load_config, validate_config, Config, ConfigError, Fetcher, ProviderCatalog, ProviderPool,
    SanitizedConfig, DEFAULT_CATALOG,
};

/// Shared application state
///
/// The catalog, config and pool are swapped together on reload. Requests
/// already running keep the pool they started with.
pub struct AppState {
    config_path: PathBuf,
    fetcher: Arc<dyn Fetcher>,
    inner: RwLock<Loaded>,
}

struct Loaded {
    config: Config,
    catalog: ProviderCatalog,
    pool: Arc<ProviderPool>,
}

/// Outcome of a catalog reload.
#[derive(Debug, Serialize)]
pub struct ReloadSummary {
    pub providers: usize,
    pub enabled: usize,
}

fn default_source(config: &Config) -> &str {
    config
        .providers
        .default_catalog
        .as_deref()
        .unwrap_or(DEFAULT_CATALOG)
}

impl AppState {
    /// Merge the catalog for `config` and build the first pool.
    pub fn new(config: Config, config_path: impl Into<PathBuf>, fetcher: Arc<dyn Fetcher>) -> Self {
        let catalog = ProviderCatalog::load(default_source(&config), &config.providers.custom);
        let pool = Arc::new(ProviderPool::new(
            catalog.records().to_vec(),
            Arc::clone(&fetcher),
            config.search.clone(),
        ));
        Self {
            config_path: config_path.into(),
            fetcher,
            inner: RwLock::new(Loaded {
                config,
                catalog,
                pool,
            }),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub async fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.inner.read().await.config)
    }

    pub async fn config(&self) -> Config {
        self.inner.read().await.config.clone()
    }

    pub async fn pool(&self) -> Arc<ProviderPool> {
        Arc::clone(&self.inner.read().await.pool)
    }

    /// Catalog summary for logging.
    pub async fn catalog_summary(&self) -> ReloadSummary {
        summarize(&self.inner.read().await.catalog)
    }

    /// Re-read the config file and re-merge the catalog against the current one.
    ///
    /// On any config error the loaded state is left as it was.
    pub async fn reload(&self) -> Result<ReloadSummary, ConfigError> {
        let config = load_config(&self.config_path)?;
        validate_config(&config)?;

        let mut inner = self.inner.write().await;
        inner
            .catalog
            .reload(default_source(&config), &config.providers.custom);
        inner.pool = Arc::new(ProviderPool::new(
            inner.catalog.records().to_vec(),
            Arc::clone(&self.fetcher),
            config.search.clone(),
        ));
        inner.config = config;

        let summary = summarize(&inner.catalog);
        info!(
            providers = summary.providers,
            enabled = summary.enabled,
            "Provider catalog reloaded"
        );
        Ok(summary)
    }
}

fn summarize(catalog: &ProviderCatalog) -> ReloadSummary {
    ReloadSummary {
        providers: catalog.records().len(),
        enabled: catalog.records().iter().filter(|r| r.enabled).count(),
    }
}
