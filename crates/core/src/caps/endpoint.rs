//! API URL normalization and known indexer quirks.

use url::Url;

/// Hosts whose behavior differs from the common contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostQuirk {
    /// nzb.su: tv-search works with free text only, never tvdbid/season/ep.
    FreeTextTvSearch,
    /// gingadaddy: no caps endpoint, plain `t=search` only.
    NoCapabilities,
    /// morethantv: the API rejects a trailing slash.
    NoTrailingSlash,
}

impl HostQuirk {
    pub fn detect(url: &str) -> Option<Self> {
        let url = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| url.to_string())
            .to_lowercase();
        if url.contains("nzb.su") {
            Some(HostQuirk::FreeTextTvSearch)
        } else if url.contains("gingadaddy") {
            Some(HostQuirk::NoCapabilities)
        } else if url.contains("morethantv") {
            Some(HostQuirk::NoTrailingSlash)
        } else {
            None
        }
    }
}

/// The URL API calls go to.
///
/// A URL whose path already has an `api` segment past `scheme://host/` is used
/// as-is; anything else gets `/api` appended.
pub fn api_url(base: &str) -> String {
    let lowered = base.to_lowercase();
    let has_api_segment = lowered
        .split('/')
        .position(|segment| segment == "api")
        .map(|index| index > 2)
        .unwrap_or(false);

    let url = if has_api_segment {
        base.to_string()
    } else {
        format!("{}/api", base.trim_end_matches('/'))
    };

    if HostQuirk::detect(&url) == Some(HostQuirk::NoTrailingSlash) {
        url.trim_end_matches('/').to_string()
    } else {
        url
    }
}
