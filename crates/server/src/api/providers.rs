//! Provider API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::warn;
use tvnab_core::{
    Capabilities, NewznabSearcher, SearchContext, SearchError, SearchMode, TvCategory,
};

use super::handlers::ErrorResponse;
use crate::state::{AppState, ReloadSummary};

// ============================================================================
// Request/Response types
// ============================================================================

/// A provider as shown to API clients. The API key itself is never included.
#[derive(Debug, Serialize)]
pub struct ProviderSummary {
    pub name: String,
    pub url: String,
    pub api_key_configured: bool,
    pub needs_auth: bool,
    pub public: bool,
    pub enabled: bool,
    pub is_default: bool,
    pub categories: Vec<u32>,
    pub search_mode: SearchMode,
    pub search_fallback: bool,
    pub enable_daily: bool,
    pub enable_backlog: bool,
    pub capabilities: Capabilities,
}

impl ProviderSummary {
    async fn from_searcher(searcher: &NewznabSearcher) -> Self {
        let record = searcher.record();
        Self {
            name: record.name.clone(),
            url: record.url.clone(),
            api_key_configured: !record.is_key_missing(),
            needs_auth: record.needs_auth(),
            public: record.is_public(),
            enabled: record.enabled,
            is_default: record.is_default,
            categories: record.categories.clone(),
            search_mode: record.search_mode,
            search_fallback: record.search_fallback,
            enable_daily: record.enable_daily,
            enable_backlog: record.enable_backlog,
            capabilities: searcher.capabilities().await,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderSummary>,
}

#[derive(Debug, Serialize)]
pub struct CapabilitiesResponse {
    pub provider: String,
    pub capabilities: Capabilities,
    pub categories: Vec<TvCategory>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/providers
///
/// List the merged provider catalog with cached capabilities.
pub async fn list_providers(State(state): State<Arc<AppState>>) -> Json<ProvidersResponse> {
    let pool = state.pool().await;
    let mut providers = Vec::new();
    for searcher in pool.providers() {
        providers.push(ProviderSummary::from_searcher(searcher).await);
    }
    Json(ProvidersResponse { providers })
}

/// POST /api/v1/providers/{name}/caps
///
/// Force capability negotiation and return the harvested TV categories.
pub async fn refresh_capabilities(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<CapabilitiesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let ctx = SearchContext::with_timeout(state.config().await.search.request_timeout());
    let pool = state.pool().await;

    match pool.refresh_capabilities(&name, &ctx).await {
        Ok(negotiation) => Ok(Json(CapabilitiesResponse {
            provider: name,
            capabilities: negotiation.capabilities,
            categories: negotiation.categories,
        })),
        Err(SearchError::ProviderNotFound(name)) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Provider not found: {}", name),
            }),
        )),
        Err(e) => {
            warn!(provider = %name, error = %e, "Capability refresh failed");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}

/// POST /api/v1/providers/reload
///
/// Re-read the config file and re-merge the provider catalog. Category
/// narrowing of defaults carries over from the catalog being replaced.
pub async fn reload_catalog(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReloadSummary>, (StatusCode, Json<ErrorResponse>)> {
    match state.reload().await {
        Ok(summary) => Ok(Json(summary)),
        Err(e) => {
            warn!(path = ?state.config_path(), error = %e, "Catalog reload failed");
            Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}
