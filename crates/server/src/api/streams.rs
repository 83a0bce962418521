//! Stream scraping and resolution handlers.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};

use debridge_core::{
    DebridError, MediaType, ProviderStatus, ResolutionOutcome, ResolveRequest, ScrapeRequest,
    StreamCandidate,
};

use super::middleware::AuthUser;
use super::{api_error, require_resolver, require_token, ApiError, ApiJson};
use crate::state::AppState;

// ============================================================================
// Request types
// ============================================================================

/// Query string of `GET /stream/scrape`.
///
/// Season and episode stay strings so that garbage degrades to 0 instead of
/// rejecting the request.
#[derive(Debug, Deserialize)]
pub struct ScrapeParams {
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub episode: Option<String>,
}

impl ScrapeParams {
    fn into_request(self) -> Result<ScrapeRequest, String> {
        let external_id = self
            .external_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| "external_id is required".to_string())?;
        let media_type = self
            .media_type
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| "type is required".to_string())?;
        let media_type = MediaType::from_str(&media_type)?;

        Ok(ScrapeRequest {
            media_type,
            external_id,
            season: parse_number(self.season.as_deref()),
            episode: parse_number(self.episode.as_deref()),
        })
    }
}

fn parse_number(value: Option<&str>) -> u32 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/stream/scrape
///
/// Query every provider and return the merged, ranked candidates.
pub async fn scrape(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScrapeParams>,
) -> Result<Json<Vec<StreamCandidate>>, ApiError> {
    let request = params
        .into_request()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;

    let result = state.coordinator().scrape_all(&request).await;

    info!(
        external_id = %request.external_id,
        media_type = %request.media_type,
        candidates = result.candidates.len(),
        failed_providers = result.provider_errors.len(),
        duration_ms = result.duration_ms,
        "Scrape finished"
    );

    Ok(Json(result.candidates))
}

/// GET /api/v1/stream/providers
pub async fn list_providers(State(state): State<Arc<AppState>>) -> Json<Vec<ProviderStatus>> {
    Json(state.coordinator().provider_status().await)
}

/// POST /api/v1/stream/resolve
///
/// Turn a magnet into a direct URL with the caller's debrid account.
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<ResolveRequest>,
) -> Result<Json<ResolutionOutcome>, ApiError> {
    if body.magnet.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "magnet is required"));
    }

    let resolver = require_resolver(&state)?;
    let token = require_token(&state, &user_id).await?;

    match resolver.resolve(&token, &body).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e @ DebridError::FileNotFound(_)) => {
            Err(api_error(StatusCode::NOT_FOUND, e.to_string()))
        }
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "Resolve failed");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
