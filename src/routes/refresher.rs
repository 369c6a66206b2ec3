//! Refresher status HTTP endpoint.
//!
//! GET /api/v1/refresher/status: returns the background refresher's state
//! (timestamps, counters, last error) as JSON.

use axum::extract::State;
use axum::Json;

use crate::services::refresher::{Refresher, WidgetStatus};

/// Get the current refresher status.
#[utoipa::path(
    get,
    path = "/api/v1/refresher/status",
    tag = "Refresher",
    responses(
        (status = 200, description = "Current refresher status", body = WidgetStatus),
    )
)]
pub async fn get_refresher_status(State(refresher): State<Refresher>) -> Json<WidgetStatus> {
    Json(refresher.status().await)
}
