use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tracing::{info, warn};

use super::newznab::NewznabSearcher;
use super::{Fetcher, SearchContext, SearchError, SweepResult};
use crate::caps::Negotiation;
use crate::config::SearchSettings;
use crate::provider::ProviderRecord;
use crate::query::{SearchRequest, ShowContext};

/// Every configured provider, searched concurrently.
///
/// Providers share nothing mutable; each searcher has its own capability
/// cache and pacing gate.
#[derive(Debug)]
pub struct ProviderPool {
    searchers: Vec<NewznabSearcher>,
}

impl ProviderPool {
    pub fn new(
        records: impl IntoIterator<Item = ProviderRecord>,
        fetcher: Arc<dyn Fetcher>,
        settings: SearchSettings,
    ) -> Self {
        let searchers = records
            .into_iter()
            .map(|record| NewznabSearcher::new(record, fetcher.clone(), settings.clone()))
            .collect();
        Self { searchers }
    }

    pub fn from_searchers(searchers: Vec<NewznabSearcher>) -> Self {
        Self { searchers }
    }

    pub fn providers(&self) -> &[NewznabSearcher] {
        &self.searchers
    }

    pub fn get(&self, name: &str) -> Option<&NewznabSearcher> {
        self.searchers.iter().find(|s| s.name() == name)
    }

    /// Search enabled providers, or just the named ones if `only` is given.
    ///
    /// A provider failure is reported in `provider_errors` and never fails
    /// the sweep.
    pub async fn search(
        &self,
        requests: &[SearchRequest],
        show: &ShowContext,
        only: Option<&[String]>,
        ctx: &SearchContext,
    ) -> SweepResult {
        let start = Instant::now();
        let mut provider_errors = HashMap::new();

        let selected: Vec<&NewznabSearcher> = match only {
            Some(names) => {
                for name in names {
                    let error = match self.get(name) {
                        None => SearchError::ProviderNotFound(name.clone()),
                        Some(s) if !s.record().enabled => SearchError::ProviderDisabled(name.clone()),
                        Some(_) => continue,
                    };
                    provider_errors.insert(name.clone(), error.to_string());
                }
                self.searchers
                    .iter()
                    .filter(|s| s.record().enabled && names.iter().any(|n| n == s.name()))
                    .collect()
            }
            None => self.searchers.iter().filter(|s| s.record().enabled).collect(),
        };

        if selected.is_empty() {
            warn!("No enabled providers to search");
        }

        let outcomes = join_all(selected.iter().map(|s| s.search(requests, show, ctx))).await;

        let mut results = HashMap::new();
        for outcome in outcomes {
            if let Some(failure) = &outcome.failure {
                provider_errors.insert(outcome.provider.clone(), failure.to_string());
            }
            results.insert(outcome.provider, outcome.results);
        }

        let sweep = SweepResult {
            results,
            provider_errors,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            providers = sweep.results.len(),
            results = sweep.total_results(),
            failures = sweep.provider_errors.len(),
            duration_ms = sweep.duration_ms,
            "Search sweep complete"
        );

        sweep
    }

    /// Force capability negotiation for one provider.
    pub async fn refresh_capabilities(
        &self,
        name: &str,
        ctx: &SearchContext,
    ) -> Result<Negotiation, SearchError> {
        let searcher = self
            .get(name)
            .ok_or_else(|| SearchError::ProviderNotFound(name.to_string()))?;
        searcher.refresh_capabilities(ctx).await
    }
}
