//! Capability-aware request parameters.
//!
//! Indexers silently return nothing when handed a parameter they do not
//! understand, so the builder removes parameters as well as adding them.

use super::{QueryParams, SearchIntent, ShowContext};
use crate::caps::Capabilities;
use crate::config::SearchSettings;
use crate::provider::ProviderRecord;

/// Page size requested from every indexer.
pub const RESULT_LIMIT: u32 = 100;

/// Build the parameters for one search call.
///
/// `term` is one free-text term; callers issue one call per distinct term.
pub fn build(
    record: &ProviderRecord,
    caps: &Capabilities,
    intent: &SearchIntent,
    show: &ShowContext,
    term: Option<&str>,
    settings: &SearchSettings,
) -> QueryParams {
    let mut params = QueryParams::new();
    params.insert(
        "t",
        if caps.supports_tv_search {
            "tvsearch"
        } else {
            "search"
        },
    );
    params.insert("limit", RESULT_LIMIT);
    params.insert("offset", 0);
    params.insert("cat", record.categories_param());
    params.insert("maxage", settings.max_age_days);
    if record.needs_auth() {
        params.insert("apikey", &record.api_key);
    }

    if intent.is_rss() {
        return strip_torznab(params, caps);
    }

    if caps.supports_tv_search && !caps.free_text_only {
        match show.tvdbid {
            Some(id) if settings.use_identity_search && caps.supports_param("tvdbid") => {
                params.insert("tvdbid", id);
            }
            _ => match intent {
                SearchIntent::AirByDate { date } => params.insert("q", date),
                SearchIntent::Absolute { number } => params.insert("ep", number),
                SearchIntent::Episode { season, episode } => {
                    params.insert("season", season);
                    params.insert("ep", episode);
                }
                SearchIntent::Season { season } => params.insert("season", season),
                SearchIntent::Rss => {}
            },
        }
    }

    if matches!(intent, SearchIntent::Season { .. }) {
        params.remove("ep");
    }

    let mut params = strip_torznab(params, caps);

    if !params.contains("tvdbid") {
        if let Some(term) = term {
            params.insert("q", term);
        }
    }

    params
}

fn strip_torznab(mut params: QueryParams, caps: &Capabilities) -> QueryParams {
    if caps.torznab {
        params.remove("ep");
        params.remove("season");
    }
    params
}
