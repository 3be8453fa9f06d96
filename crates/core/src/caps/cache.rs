use tokio::sync::Mutex;

use super::negotiator::{negotiate, NegotiationError};
use super::types::{Capabilities, Negotiation, TvCategory};
use crate::config::SearchSettings;
use crate::provider::ProviderRecord;
use crate::searcher::{Fetcher, SearchContext};

#[derive(Debug, Default)]
struct CacheState {
    capabilities: Capabilities,
    categories: Vec<TvCategory>,
}

/// Capabilities of one provider, negotiated at most once unless forced.
///
/// The lock is held for the whole negotiation, so concurrent callers wait for
/// the in-flight request instead of issuing their own.
#[derive(Debug, Default)]
pub struct CapabilityCache {
    state: Mutex<CacheState>,
}

impl CapabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache seeded with known capabilities.
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            state: Mutex::new(CacheState {
                capabilities,
                categories: Vec::new(),
            }),
        }
    }

    pub async fn current(&self) -> Capabilities {
        self.state.lock().await.capabilities.clone()
    }

    pub async fn categories(&self) -> Vec<TvCategory> {
        self.state.lock().await.categories.clone()
    }

    /// Return cached capabilities, negotiating first if none are discovered
    /// yet or `force` is set.
    ///
    /// A failed negotiation leaves the cached value untouched.
    pub async fn ensure(
        &self,
        record: &ProviderRecord,
        fetcher: &dyn Fetcher,
        settings: &SearchSettings,
        ctx: &SearchContext,
        force: bool,
    ) -> Result<Negotiation, NegotiationError> {
        let mut state = self.state.lock().await;
        if state.capabilities.discovered && !force {
            return Ok(Negotiation {
                capabilities: state.capabilities.clone(),
                categories: state.categories.clone(),
            });
        }

        let negotiation = negotiate(record, fetcher, settings, ctx).await?;
        state.capabilities = negotiation.capabilities.clone();
        state.categories = negotiation.categories.clone();
        Ok(negotiation)
    }

    /// Record that a search response showed torznab markers.
    pub async fn mark_torznab(&self) {
        self.state.lock().await.capabilities.torznab = true;
    }

    pub async fn invalidate(&self) {
        *self.state.lock().await = CacheState::default();
    }
}
