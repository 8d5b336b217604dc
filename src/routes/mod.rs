// Route modules
pub mod billing;
pub mod digest;
pub mod quota;

use crate::{
    app_state::AppState,
    middleware::{auth_middleware, logging_middleware, rate_limit_middleware},
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer};

// Upper bound for a whole request, comfortably above the per-call provider
// timeouts so the pipeline's own errors win in the normal case.
const REQUEST_DEADLINE: Duration = Duration::from_secs(120);

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_v1_routes(state.clone()))
        .layer(TimeoutLayer::new(REQUEST_DEADLINE))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API v1 routes
fn api_v1_routes(state: AppState) -> Router<AppState> {
    // Digest generation calls paid external services; rate limit it on top
    // of authentication
    let rate_limiter =
        rate_limit_middleware(state.redis.clone(), state.config.rate_limit.clone());
    let protected_routes = Router::new()
        .route("/digest", post(digest::create_digest))
        .route_layer(middleware::from_fn(rate_limiter))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Auth-only routes (no rate limiting)
    let auth_only_routes = Router::new()
        .route("/quota", get(quota::get_quota))
        .route("/digests", get(digest::list_digests))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Public routes (authenticated by the shared webhook secret instead)
    let public_routes = Router::new().route("/billing/webhook", post(billing::checkout_webhook));

    Router::new()
        .merge(protected_routes)
        .merge(auth_only_routes)
        .merge(public_routes)
        .layer(middleware::from_fn(logging_middleware))
}
