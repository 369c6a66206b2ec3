use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::refresher::Refresher;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status ("ok" when a fresh view is available, "degraded" otherwise)
    pub status: String,
    /// API version
    pub version: String,
    /// Whether any weather view has been built
    pub has_weather: bool,
}

/// Health check endpoint.
///
/// Always 200 so load balancers can tell a running-but-degraded service
/// (no view yet, or the latest refresh failed) from a dead one.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse),
    )
)]
pub async fn health_check(State(refresher): State<Refresher>) -> Json<HealthResponse> {
    let state = refresher.state();
    let s = state.read().await;
    let healthy = s.view.is_some() && !s.is_stale();

    Json(HealthResponse {
        status: if healthy {
            "ok".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        has_weather: s.view.is_some(),
    })
}
