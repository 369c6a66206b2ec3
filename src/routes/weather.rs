//! Weather HTTP endpoints.
//!
//! - GET  /api/v1/weather         : last built view-model
//! - POST /api/v1/weather/refresh : fetch now, then respond like GET

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::{AppError, ErrorResponse};
use crate::services::refresher::Refresher;
use crate::services::view_model::WeatherViewModel;

/// Header set when the body predates a failed refresh.
const STALE_HEADER: &str = "x-weather-stale";

/// Weather widget response.
#[derive(Debug, Serialize, ToSchema)]
pub struct WeatherResponse {
    /// Location display name (e.g. "Glasgow, Scotland")
    pub location_name: String,
    /// Whether the most recent refresh failed and this is the last good view
    pub stale: bool,
    /// When the view was fetched from the provider (ISO 8601)
    pub fetched_at: Option<String>,
    /// Rendering-ready weather view-model
    pub weather: WeatherViewModel,
}

/// Read the published view, or `WeatherUnavailable` if none was ever built.
async fn current_response(
    refresher: &Refresher,
) -> Result<(HeaderMap, Json<WeatherResponse>), AppError> {
    let state = refresher.state();
    let s = state.read().await;

    let view = s.view.clone().ok_or_else(|| {
        AppError::WeatherUnavailable(
            s.last_error
                .clone()
                .unwrap_or_else(|| "no refresh has completed yet".to_string()),
        )
    })?;

    let stale = s.is_stale();
    let mut headers = HeaderMap::new();
    if stale {
        headers.insert(STALE_HEADER, HeaderValue::from_static("true"));
    }

    Ok((
        headers,
        Json(WeatherResponse {
            location_name: refresher.location().name.clone(),
            stale,
            fetched_at: s.fetched_at.map(|dt| dt.to_rfc3339()),
            weather: view,
        }),
    ))
}

/// Get the current weather view.
///
/// Served from the background refresher's last successful build. When the
/// latest refresh failed, the previous view is returned with `stale: true`
/// and the `X-Weather-Stale: true` header.
#[utoipa::path(
    get,
    path = "/api/v1/weather",
    tag = "Weather",
    responses(
        (status = 200, description = "Current weather view", body = WeatherResponse,
         headers(
             ("X-Weather-Stale" = String, description = "Set to 'true' when the latest refresh failed")
         )),
        (status = 503, description = "No weather has been loaded yet", body = ErrorResponse),
    )
)]
pub async fn get_weather(
    State(refresher): State<Refresher>,
) -> Result<(HeaderMap, Json<WeatherResponse>), AppError> {
    current_response(&refresher).await
}

/// Refresh the weather view now.
///
/// Fetches from the provider immediately. If the fetch fails but an earlier
/// view exists, that view is returned as stale; otherwise the error is returned.
#[utoipa::path(
    post,
    path = "/api/v1/weather/refresh",
    tag = "Weather",
    responses(
        (status = 200, description = "Weather view after the refresh", body = WeatherResponse,
         headers(
             ("X-Weather-Stale" = String, description = "Set to 'true' when the refresh failed")
         )),
        (status = 502, description = "Provider unreachable or payload malformed, nothing retained", body = ErrorResponse),
    )
)]
pub async fn refresh_weather(
    State(refresher): State<Refresher>,
) -> Result<(HeaderMap, Json<WeatherResponse>), AppError> {
    if let Err(e) = refresher.refresh_once().await {
        let has_view = refresher.state().read().await.view.is_some();
        if !has_view {
            return Err(e);
        }
    }
    current_response(&refresher).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::open_meteo::{Location, OpenMeteoClient, PayloadShape};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn refresher_for(server: &MockServer) -> Refresher {
        let client = OpenMeteoClient::new(&server.uri(), "test").unwrap();
        let location = Location {
            name: "Glasgow, Scotland".to_string(),
            latitude: 55.864239,
            longitude: -4.251835,
        };
        Refresher::new(client, location, PayloadShape::Legacy, 3600)
    }

    async fn mount_legacy(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "current_weather": { "temperature": 9.4, "weathercode": 3 }
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_get_weather_before_first_refresh() {
        let server = MockServer::start().await;
        let refresher = refresher_for(&server);
        let err = get_weather(State(refresher)).await.unwrap_err();
        assert!(matches!(err, AppError::WeatherUnavailable(_)));
    }

    #[tokio::test]
    async fn test_refresh_then_get() {
        let server = MockServer::start().await;
        mount_legacy(&server).await;
        let refresher = refresher_for(&server);

        let (headers, Json(body)) = refresh_weather(State(refresher.clone())).await.unwrap();
        assert!(headers.get(STALE_HEADER).is_none());
        assert_eq!(body.weather.label, "Overcast");
        assert_eq!(body.weather.temperature_c, 9);
        assert!(!body.stale);

        let (_, Json(body)) = get_weather(State(refresher)).await.unwrap();
        assert_eq!(body.location_name, "Glasgow, Scotland");
        assert!(body.fetched_at.is_some());
    }

    #[tokio::test]
    async fn test_refresh_failure_serves_stale_view() {
        let server = MockServer::start().await;
        mount_legacy(&server).await;
        let refresher = refresher_for(&server);
        refresh_weather(State(refresher.clone())).await.unwrap();

        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (headers, Json(body)) = refresh_weather(State(refresher)).await.unwrap();
        assert_eq!(
            headers.get(STALE_HEADER).and_then(|v| v.to_str().ok()),
            Some("true")
        );
        assert!(body.stale);
        assert_eq!(body.weather.label, "Overcast");
    }

    #[tokio::test]
    async fn test_refresh_failure_without_view_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let refresher = refresher_for(&server);
        let err = refresh_weather(State(refresher)).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalServiceError(_)));
    }
}
