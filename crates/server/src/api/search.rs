//! Search API handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::info;
use tvnab_core::{SearchContext, SearchRequest, ShowContext, SweepResult};

use super::handlers::ErrorResponse;
use crate::state::AppState;

/// Upper bound on a caller-supplied sweep timeout.
const MAX_SWEEP_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Deserialize)]
pub struct SweepRequest {
    /// Search modes in the order they are tried.
    pub requests: Vec<SearchRequest>,
    #[serde(default)]
    pub show: ShowContext,
    /// Limit the sweep to these providers (default: all enabled).
    #[serde(default)]
    pub providers: Option<Vec<String>>,
    /// Deadline for the whole sweep. Partial results are returned when it hits.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// POST /api/v1/search
///
/// Search every enabled provider concurrently.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SweepRequest>,
) -> Result<Json<SweepResult>, (StatusCode, Json<ErrorResponse>)> {
    if body.requests.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "At least one search request is required".to_string(),
            }),
        ));
    }

    let ctx = match body.timeout_secs {
        Some(secs) => {
            SearchContext::with_timeout(Duration::from_secs(secs.clamp(1, MAX_SWEEP_TIMEOUT_SECS)))
        }
        None => SearchContext::new(),
    };

    info!(
        modes = body.requests.len(),
        tvdbid = ?body.show.tvdbid,
        "Search requested"
    );

    let sweep = state
        .pool()
        .await
        .search(&body.requests, &body.show, body.providers.as_deref(), &ctx)
        .await;

    Ok(Json(sweep))
}
