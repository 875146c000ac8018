//! Health check endpoint handlers.
//!
//! Health checks ping the user store directly rather than going through
//! the users service.

use std::collections::HashMap;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ComponentHealth, HealthResponse, HealthStatus};
use crate::state::AppState;

/// Creates health check routes.
///
/// # Routes
/// - `GET /_api/health` - Full health report
/// - `GET /_api/health/ready` - Readiness probe
/// - `GET /_api/health/live` - Liveness probe
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/_api/health", get(health_check))
        .route("/_api/health/ready", get(readiness_check))
        .route("/_api/health/live", get(liveness_check))
}

/// Health report including user store connectivity.
#[utoipa::path(
    get,
    path = "/_api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    ),
    tag = HEALTH_TAG
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = check_store(&state).await;
    let status = store.status;

    let mut checks = HashMap::new();
    checks.insert("store".to_string(), store);

    let response = HealthResponse {
        status,
        version: crate::pkg_version().to_string(),
        timestamp: jiff::Timestamp::now().to_string(),
        checks,
    };

    let code = match status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(response))
}

#[utoipa::path(
    get,
    path = "/_api/health/ready",
    responses(
        (status = 200, description = "Service is ready"),
        (status = 503, description = "Service is not ready")
    ),
    tag = HEALTH_TAG
)]
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    match check_store(&state).await.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded | HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[utoipa::path(
    get,
    path = "/_api/health/live",
    responses((status = 200, description = "Service is alive")),
    tag = HEALTH_TAG
)]
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

async fn check_store(state: &AppState) -> ComponentHealth {
    let start = Instant::now();
    let outcome = state.store.ping().await;
    let response_time_ms = Some(start.elapsed().as_millis() as u64);

    match outcome {
        Ok(()) => ComponentHealth {
            status: HealthStatus::Healthy,
            message: Some("Connected".to_string()),
            response_time_ms,
        },
        Err(e) => {
            tracing::warn!(error = %e, "User store health check failed");
            ComponentHealth {
                status: HealthStatus::Unhealthy,
                message: Some(e.to_string()),
                response_time_ms,
            }
        }
    }
}
