//! Direct debrid account handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::warn;

use debridge_core::{DebridAccount, UnrestrictedLink};

use super::middleware::AuthUser;
use super::{api_error, require_resolver, require_token, ApiError, ApiJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UnrestrictRequest {
    #[serde(default)]
    pub link: String,
}

/// POST /api/v1/debrid/unrestrict
///
/// Convert a hoster link into a direct download link.
pub async fn unrestrict(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<UnrestrictRequest>,
) -> Result<Json<UnrestrictedLink>, ApiError> {
    if body.link.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "link is required"));
    }

    let resolver = require_resolver(&state)?;
    let token = require_token(&state, &user_id).await?;

    resolver
        .unrestrict(&token, body.link.trim())
        .await
        .map(Json)
        .map_err(|e| {
            warn!(user_id = %user_id, error = %e, "Unrestrict failed");
            api_error(StatusCode::BAD_REQUEST, e.to_string())
        })
}

/// GET /api/v1/debrid/account
pub async fn account(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<DebridAccount>, ApiError> {
    let resolver = require_resolver(&state)?;
    let token = require_token(&state, &user_id).await?;

    resolver.account(&token).await.map(Json).map_err(|e| {
        warn!(user_id = %user_id, error = %e, "Account lookup failed");
        api_error(StatusCode::BAD_GATEWAY, e.to_string())
    })
}
