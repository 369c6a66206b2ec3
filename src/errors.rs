use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::view_model::BuildError;

/// Static message shown by the widget when there is nothing to display.
pub const WEATHER_UNAVAILABLE_MESSAGE: &str = "Unable to load weather.";

/// Standard error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Weather unavailable: {0}")]
    WeatherUnavailable(String),

    #[error("Malformed provider payload: {0}")]
    MalformedPayload(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<BuildError> for AppError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::MalformedPayload(msg) => AppError::MalformedPayload(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Provider details stay in the logs; the widget only ever shows the fallback text.
        let (status, message) = match &self {
            AppError::WeatherUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                WEATHER_UNAVAILABLE_MESSAGE.to_string(),
            ),
            AppError::MalformedPayload(msg) | AppError::ExternalServiceError(msg) => {
                tracing::warn!("Weather provider error: {}", msg);
                (StatusCode::BAD_GATEWAY, WEATHER_UNAVAILABLE_MESSAGE.to_string())
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };

        (status, axum::Json(ErrorResponse { error: message })).into_response()
    }
}
