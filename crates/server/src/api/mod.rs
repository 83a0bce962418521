pub mod debrid;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod streams;

pub use routes::create_router;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use debridge_core::DebridResolver;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error half of every fallible handler.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// JSON body extractor whose rejections are 400s in the [`ErrorResponse`]
/// shape.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(api_error(StatusCode::BAD_REQUEST, rejection.body_text())),
        }
    }
}

pub(crate) fn require_resolver(state: &AppState) -> Result<&DebridResolver, ApiError> {
    state.resolver().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Debrid backend not configured",
        )
    })
}

/// Debrid token of the caller; 409 when they have none.
pub(crate) async fn require_token(state: &AppState, user_id: &str) -> Result<String, ApiError> {
    state
        .credentials()
        .debrid_token(user_id)
        .await
        .ok_or_else(|| {
            api_error(
                StatusCode::CONFLICT,
                "No debrid token configured for this user",
            )
        })
}
