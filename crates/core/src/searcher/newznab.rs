//! Per-provider search over the newznab/torznab API.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::dedup::aggregate;
use super::pacing::PacingGate;
use super::response::{validate_and_parse, ResponseError};
use super::{FetchError, Fetcher, SearchContext, SearchError, SearchOutcome, SearchResult};
use crate::caps::{api_url, Capabilities, CapabilityCache, Negotiation, TvCategory};
use crate::config::SearchSettings;
use crate::metrics;
use crate::provider::ProviderRecord;
use crate::query::{build, SearchRequest, ShowContext};

/// Searches one indexer. Owns its capability cache and pacing gate.
pub struct NewznabSearcher {
    record: ProviderRecord,
    fetcher: Arc<dyn Fetcher>,
    settings: SearchSettings,
    caps: CapabilityCache,
    pacing: PacingGate,
}

impl std::fmt::Debug for NewznabSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewznabSearcher")
            .field("provider", &self.record.name)
            .field("url", &self.record.url)
            .field("pacing", &self.pacing)
            .finish()
    }
}

/// How the term loop of one mode ended.
enum TermFlow {
    Continue,
    NextMode,
    Stop,
}

impl NewznabSearcher {
    pub fn new(record: ProviderRecord, fetcher: Arc<dyn Fetcher>, settings: SearchSettings) -> Self {
        let pacing = PacingGate::new(settings.load_preset);
        Self {
            record,
            fetcher,
            settings,
            caps: CapabilityCache::new(),
            pacing,
        }
    }

    /// Start from known capabilities instead of negotiating.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.caps = CapabilityCache::with_capabilities(capabilities);
        self
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn record(&self) -> &ProviderRecord {
        &self.record
    }

    pub async fn capabilities(&self) -> Capabilities {
        self.caps.current().await
    }

    pub async fn categories(&self) -> Vec<TvCategory> {
        self.caps.categories().await
    }

    /// Renegotiate capabilities even if already discovered.
    pub async fn refresh_capabilities(
        &self,
        ctx: &SearchContext,
    ) -> Result<Negotiation, SearchError> {
        self.caps
            .ensure(&self.record, self.fetcher.as_ref(), &self.settings, ctx, true)
            .await
            .map_err(SearchError::from)
    }

    /// Run every request in order and aggregate the results.
    ///
    /// Failures stop the search early but never discard what was already
    /// gathered; the outcome carries both.
    pub async fn search(
        &self,
        requests: &[SearchRequest],
        show: &ShowContext,
        ctx: &SearchContext,
    ) -> SearchOutcome {
        let name = self.record.name.as_str();

        if self.record.is_key_missing() {
            warn!(provider = %name, "Invalid API key, check your provider settings");
            return SearchOutcome::failed(name, SearchError::AuthConfig(name.to_string()));
        }

        let mut caps = match self
            .caps
            .ensure(&self.record, self.fetcher.as_ref(), &self.settings, ctx, false)
            .await
        {
            Ok(negotiation) => negotiation.capabilities,
            Err(e) => {
                warn!(provider = %name, error = %e, "No capabilities, skipping provider");
                return SearchOutcome::failed(name, e.into());
            }
        };

        let url = api_url(&self.record.url);
        let mut collected: Vec<SearchResult> = Vec::new();
        let mut failure = None;
        let mut requests_made = 0;

        'modes: for request in requests {
            debug!(provider = %name, mode = %request.intent, "Search mode");

            let terms: Vec<Option<&str>> = match request.distinct_terms() {
                terms if terms.is_empty() || request.intent.is_rss() => vec![None],
                terms => terms.into_iter().map(Some).collect(),
            };

            for term in terms {
                if let Err(e) = self.pacing.wait(ctx).await {
                    failure = Some(e);
                    break 'modes;
                }

                let params = build(&self.record, &caps, &request.intent, show, term, &self.settings);
                if let Some(term) = term {
                    debug!(provider = %name, term = %term, "Search string");
                }

                requests_made += 1;
                let started = Instant::now();
                let fetched = self
                    .fetcher
                    .fetch_text(&url, &params, ctx.bound(self.settings.request_timeout()), &ctx.cancel)
                    .await;
                metrics::PROVIDER_REQUEST_DURATION
                    .with_label_values(&["search"])
                    .observe(started.elapsed().as_secs_f64());

                let flow = match fetched {
                    Err(FetchError::Cancelled) => {
                        failure = Some(SearchError::Cancelled);
                        TermFlow::Stop
                    }
                    Err(e) => {
                        metrics::record_request(name, "search", "fetch_error");
                        warn!(provider = %name, error = %e, "Search request failed");
                        failure = Some(SearchError::Fetch(e.to_string()));
                        TermFlow::NextMode
                    }
                    Ok(raw) => self.absorb(&raw, &mut caps, &mut collected, &mut failure).await,
                };

                match flow {
                    TermFlow::Stop => break 'modes,
                    TermFlow::NextMode => break,
                    TermFlow::Continue => {}
                }

                // Identity search is authoritative, the other terms would repeat it
                if params.contains("tvdbid") {
                    break;
                }
            }
        }

        let results = aggregate(collected, caps.torznab);
        metrics::SEARCH_RESULTS
            .with_label_values(&[name])
            .observe(results.len() as f64);
        debug!(
            provider = %name,
            results = results.len(),
            requests = requests_made,
            torznab = caps.torznab,
            "Provider search complete"
        );

        SearchOutcome {
            provider: name.to_string(),
            results,
            failure,
            requests_made,
        }
    }

    async fn absorb(
        &self,
        raw: &str,
        caps: &mut Capabilities,
        collected: &mut Vec<SearchResult>,
        failure: &mut Option<SearchError>,
    ) -> TermFlow {
        let name = self.record.name.as_str();
        match validate_and_parse(raw, caps, name) {
            Ok(parsed) => {
                metrics::record_request(name, "search", "ok");
                if parsed.torznab && !caps.torznab {
                    debug!(provider = %name, "Response is torznab-flavored");
                    caps.torznab = true;
                    self.caps.mark_torznab().await;
                }
                if parsed.skipped > 0 {
                    metrics::ITEMS_SKIPPED
                        .with_label_values(&[name])
                        .inc_by(parsed.skipped as u64);
                }
                collected.extend(parsed.results);
                TermFlow::Continue
            }
            Err(ResponseError::Fetch) => {
                metrics::record_request(name, "search", "empty");
                debug!(provider = %name, "No data was returned from the provider");
                *failure = Some(SearchError::Fetch("empty response".to_string()));
                TermFlow::NextMode
            }
            Err(ResponseError::ProviderReported(description)) => {
                metrics::record_request(name, "search", "provider_error");
                info!(provider = %name, error = %description, "Indexer reported an error");
                *failure = Some(SearchError::ProviderReported(description));
                TermFlow::Stop
            }
            Err(ResponseError::Parse(message)) => {
                metrics::record_request(name, "search", "parse_error");
                warn!(provider = %name, error = %message, "Unreadable response, skipping term");
                TermFlow::Continue
            }
        }
    }
}
