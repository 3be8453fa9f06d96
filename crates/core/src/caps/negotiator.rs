//! `t=caps` negotiation.

use std::time::Instant;

use thiserror::Error;
use tracing::{debug, warn};

use super::endpoint::{api_url, HostQuirk};
use super::types::{Capabilities, Negotiation, TvCategory, DEFAULT_TV_SEARCH_PARAMS};
use crate::config::SearchSettings;
use crate::metrics;
use crate::provider::ProviderRecord;
use crate::query::QueryParams;
use crate::searcher::{FetchError, Fetcher, SearchContext};
use crate::xml::{XmlDocument, XmlElement};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NegotiationError {
    #[error("API key required but not configured for {0}")]
    AuthConfig(String),

    #[error("Capability request failed: {0}")]
    Fetch(String),

    #[error("Invalid capability document: {0}")]
    Parse(String),

    #[error("Capability request cancelled")]
    Cancelled,
}

/// Discover what `record`'s endpoint supports.
///
/// Makes at most one request. Known quirky hosts are answered locally.
pub async fn negotiate(
    record: &ProviderRecord,
    fetcher: &dyn Fetcher,
    settings: &SearchSettings,
    ctx: &SearchContext,
) -> Result<Negotiation, NegotiationError> {
    if record.is_key_missing() {
        warn!(provider = %record.name, "API key missing, cannot negotiate capabilities");
        return Err(NegotiationError::AuthConfig(record.name.clone()));
    }

    match HostQuirk::detect(&record.url) {
        Some(HostQuirk::FreeTextTvSearch) => {
            debug!(provider = %record.name, "Free-text tv-search host, skipping caps request");
            return Ok(Negotiation {
                capabilities: Capabilities::free_text(),
                categories: Vec::new(),
            });
        }
        Some(HostQuirk::NoCapabilities) => {
            debug!(provider = %record.name, "Host has no caps endpoint, using plain search");
            return Ok(Negotiation {
                capabilities: Capabilities::search_only(),
                categories: Vec::new(),
            });
        }
        _ => {}
    }

    if ctx.is_done() {
        return Err(NegotiationError::Cancelled);
    }

    let url = api_url(&record.url);
    let mut params = QueryParams::new();
    params.insert("t", "caps");
    if record.needs_auth() {
        params.insert("apikey", &record.api_key);
    }

    let started = Instant::now();
    let fetched = fetcher
        .fetch_text(&url, &params, ctx.bound(settings.request_timeout()), &ctx.cancel)
        .await;
    metrics::PROVIDER_REQUEST_DURATION
        .with_label_values(&["caps"])
        .observe(started.elapsed().as_secs_f64());

    let body = match fetched {
        Ok(body) if !body.trim().is_empty() => body,
        Ok(_) => {
            metrics::record_request(&record.name, "caps", "fetch_error");
            warn!(provider = %record.name, "Empty capability response");
            return Err(NegotiationError::Fetch("empty response".to_string()));
        }
        Err(FetchError::Cancelled) => return Err(NegotiationError::Cancelled),
        Err(e) => {
            metrics::record_request(&record.name, "caps", "fetch_error");
            warn!(provider = %record.name, error = %e, "Capability request failed");
            return Err(NegotiationError::Fetch(e.to_string()));
        }
    };

    let negotiation = XmlDocument::parse(&body)
        .map_err(|e| NegotiationError::Parse(e.to_string()))
        .and_then(|doc| parse_capabilities(&doc));

    match &negotiation {
        Ok(n) => {
            metrics::record_request(&record.name, "caps", "ok");
            debug!(
                provider = %record.name,
                tv_search = n.capabilities.supports_tv_search,
                params = ?n.capabilities.supported_params,
                torznab = n.capabilities.torznab,
                categories = n.categories.len(),
                "Capabilities negotiated"
            );
        }
        Err(e) => {
            metrics::record_request(&record.name, "caps", "parse_error");
            warn!(provider = %record.name, error = %e, "Capability document rejected");
        }
    }

    negotiation
}

/// Extract capabilities and the TV category tree from a caps document.
pub fn parse_capabilities(doc: &XmlDocument) -> Result<Negotiation, NegotiationError> {
    let categories = doc.find("categories");
    let searching = doc.find("searching");

    let (categories, searching) = match (categories, searching) {
        (Some(c), Some(s)) => (c, s),
        (c, _) => {
            let missing = if c.is_none() { "categories" } else { "searching" };
            let detail = provider_error(doc)
                .map(|d| format!(" (indexer said: {})", d))
                .unwrap_or_default();
            return Err(NegotiationError::Parse(format!(
                "missing {} element{}",
                missing, detail
            )));
        }
    };

    let mut capabilities = match searching.child("tv-search") {
        Some(tv) if tv.attr("available") == Some("yes") => {
            let params = tv.attr("supportedParams").unwrap_or(DEFAULT_TV_SEARCH_PARAMS);
            Capabilities::tv_search(params.split(','))
        }
        _ => Capabilities::search_only(),
    };
    capabilities.torznab = detect_torznab(doc);

    Ok(Negotiation {
        capabilities,
        categories: tv_categories(categories),
    })
}

/// Whether the document carries torznab namespacing.
pub fn detect_torznab(doc: &XmlDocument) -> bool {
    doc.root().attr("xmlns:torznab").is_some() || doc.any_name_starts_with("torznab:")
}

fn tv_categories(categories: &XmlElement) -> Vec<TvCategory> {
    let mut out = Vec::new();
    for category in categories.children().iter().filter(|c| c.name == "category") {
        let (Some(id), Some(name)) = (category.attr("id"), category.attr("name")) else {
            continue;
        };
        if !name.contains("TV") {
            continue;
        }
        out.push(TvCategory {
            id: id.to_string(),
            name: name.to_string(),
        });
        for subcat in category.children().iter().filter(|c| c.name == "subcat") {
            if let (Some(id), Some(name)) = (subcat.attr("id"), subcat.attr("name")) {
                out.push(TvCategory {
                    id: id.to_string(),
                    name: name.to_string(),
                });
            }
        }
    }
    out
}

fn provider_error(doc: &XmlDocument) -> Option<&str> {
    doc.find("error")
        .and_then(|e| e.attr("description"))
        .map(str::trim)
        .filter(|d| !d.is_empty())
}
