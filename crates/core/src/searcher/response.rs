//! Response validation and item extraction.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use super::SearchResult;
use crate::caps::{detect_torznab, Capabilities};
use crate::xml::{XmlDocument, XmlElement};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    #[error("No data returned from the indexer")]
    Fetch,

    #[error("Malformed response: {0}")]
    Parse(String),

    #[error("{0}")]
    ProviderReported(String),
}

/// Why a single item was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("item has no title")]
    MissingTitle,

    #[error("item has no download link")]
    MissingLink,
}

/// Items from one valid response document.
#[derive(Debug, Clone, Default)]
pub struct ParsedResponse {
    /// Items in document order.
    pub results: Vec<SearchResult>,
    /// Torznab markers seen, from the capabilities or this response.
    pub torznab: bool,
    pub skipped: usize,
}

/// Classify a raw response and extract its items.
///
/// A document with neither `categories` nor `item` elements and no error
/// description counts as a valid empty result set.
pub fn validate_and_parse(
    raw: &str,
    caps: &Capabilities,
    provider: &str,
) -> Result<ParsedResponse, ResponseError> {
    if raw.trim().is_empty() {
        return Err(ResponseError::Fetch);
    }

    let doc = XmlDocument::parse(raw).map_err(|e| ResponseError::Parse(e.to_string()))?;

    let has_markers = doc.contains("categories") || doc.contains("item");
    if !has_markers {
        if let Some(description) = error_description(&doc) {
            return Err(ResponseError::ProviderReported(description.to_string()));
        }
    }

    let torznab = caps.torznab || detect_torznab(&doc);
    let mut parsed = ParsedResponse {
        torznab,
        ..ParsedResponse::default()
    };

    for item in doc.find_all("item") {
        match parse_item(item, torznab, provider) {
            Ok(result) => parsed.results.push(result),
            Err(e) => {
                debug!(provider = %provider, error = %e, "Skipping item");
                parsed.skipped += 1;
            }
        }
    }

    Ok(parsed)
}

fn error_description(doc: &XmlDocument) -> Option<&str> {
    doc.find("error")
        .and_then(|e| e.attr("description"))
        .map(str::trim)
        .filter(|d| !d.is_empty())
}

/// Parse one `<item>`.
pub fn parse_item(
    item: &XmlElement,
    torznab: bool,
    provider: &str,
) -> Result<SearchResult, ItemError> {
    let title = item
        .child_text("title")
        .map(|t| t.replace(' ', "."))
        .ok_or(ItemError::MissingTitle)?;

    let enclosure = item.child("enclosure");
    let download_url = item
        .child_text("link")
        .or_else(|| enclosure.and_then(|e| e.attr("url")))
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or(ItemError::MissingLink)?;

    let size = item
        .child_text("size")
        .and_then(|s| s.parse::<i64>().ok())
        .or_else(|| extended_attr(item, "size").and_then(|s| s.parse().ok()))
        .or_else(|| {
            enclosure
                .and_then(|e| e.attr("length"))
                .and_then(|s| s.trim().parse().ok())
        })
        .filter(|s| *s >= 0)
        .unwrap_or(-1);

    let seeders = if torznab {
        extended_attr(item, "seeders")
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(0)
    } else {
        0
    };

    let publish_date = item
        .child_text("pubDate")
        .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
        .map(|d| d.with_timezone(&Utc));

    Ok(SearchResult {
        title,
        download_url,
        size,
        seeders,
        publish_date,
        provider: provider.to_string(),
    })
}

/// Value of `<newznab:attr name=..>` or `<torznab:attr name=..>`.
fn extended_attr<'a>(item: &'a XmlElement, name: &str) -> Option<&'a str> {
    item.children()
        .iter()
        .filter(|c| c.name == "newznab:attr" || c.name == "torznab:attr")
        .find(|c| c.attr("name") == Some(name))
        .and_then(|c| c.attr("value"))
        .map(str::trim)
}
