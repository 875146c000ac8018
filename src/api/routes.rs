//! Router configuration for the API.

use std::time::Duration;

use axum::{middleware, routing::get, Json, Router};
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{logging_middleware, request_id_middleware};
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Layers run in reverse order of declaration:
/// 1. Request ID middleware - generates/propagates request IDs
/// 2. Logging middleware - logs requests with request IDs
/// 3. Timeout - answers 408 once `request_timeout` elapses
///
/// # Routes
/// - `/_api/user[/{name}]` - user resource
/// - `/_api/health` - health checks
/// - `/_api/openapi.json` - OpenAPI document
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .merge(handlers::users::user_routes())
        .merge(handlers::health::health_routes())
        .route("/_api/openapi.json", get(openapi))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
