use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::middleware::{auth_middleware, metrics_middleware};
use super::{debrid, handlers, streams};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Routes that require an authenticated caller
    let protected = Router::new()
        .route("/config", get(handlers::get_config))
        // Scraping
        .route("/stream/scrape", get(streams::scrape))
        .route("/stream/providers", get(streams::list_providers))
        // Debrid resolution
        .route("/stream/resolve", post(streams::resolve))
        .route("/debrid/unrestrict", post(debrid::unrestrict))
        .route("/debrid/account", get(debrid::account))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth_middleware,
        ));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .merge(protected)
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
