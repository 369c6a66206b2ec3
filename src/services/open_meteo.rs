//! Open-Meteo forecast client.
//!
//! Fetches the raw payload for a single location. The response body is
//! returned untouched as `serde_json::Value`; turning it into something
//! displayable is `view_model::build`'s job.
//! See: https://open-meteo.com/en/docs

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use std::str::FromStr;
use std::time::Duration;
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::services::view_model::MAX_FORECAST_DAYS;

pub const OPEN_METEO_API_URL: &str = "https://api.open-meteo.com/v1";

/// Per-request timeout.
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Variables requested in the `current` block.
const CURRENT_VARIABLES: &str = "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m";

/// Variables requested in the `daily` block.
const DAILY_VARIABLES: &str = "weather_code,temperature_2m_max,temperature_2m_min";

/// A fixed forecast location.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Location {
    /// Display name (e.g. "Glasgow, Scotland")
    pub name: String,
    /// Latitude (WGS84)
    pub latitude: f64,
    /// Longitude (WGS84)
    pub longitude: f64,
}

/// Which payload shape to ask the provider for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadShape {
    /// `current` + `daily` blocks (temperature, humidity, wind, forecast).
    #[default]
    Current,
    /// `current_weather=true` (temperature and weather code only).
    Legacy,
}

impl FromStr for PayloadShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current" => Ok(Self::Current),
            "legacy" | "current_weather" => Ok(Self::Legacy),
            other => Err(format!("unknown payload shape '{}'", other)),
        }
    }
}

/// Client for the Open-Meteo forecast API.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl OpenMeteoClient {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
        })
    }

    /// Build the forecast request URL for a location and shape.
    pub fn forecast_url(&self, location: &Location, shape: PayloadShape) -> String {
        // 4 decimal places is ~11 m, plenty for a city-level widget
        let lat_str = format!("{:.4}", location.latitude);
        let lon_str = format!("{:.4}", location.longitude);

        match shape {
            PayloadShape::Current => format!(
                "{}/forecast?latitude={}&longitude={}&current={}&daily={}\
                 &timezone=auto&forecast_days={}&temperature_unit=celsius&wind_speed_unit=kmh",
                self.base_url, lat_str, lon_str, CURRENT_VARIABLES, DAILY_VARIABLES, MAX_FORECAST_DAYS
            ),
            PayloadShape::Legacy => format!(
                "{}/forecast?latitude={}&longitude={}&current_weather=true&temperature_unit=celsius",
                self.base_url, lat_str, lon_str
            ),
        }
    }

    /// Fetch the raw forecast payload. One request, no retries.
    pub async fn fetch(
        &self,
        location: &Location,
        shape: PayloadShape,
    ) -> Result<serde_json::Value, AppError> {
        let url = self.forecast_url(location, shape);

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .map_err(|e| AppError::InternalError(format!("Invalid User-Agent: {}", e)))?,
        );

        tracing::debug!("Fetching Open-Meteo forecast: {}", url);

        let response = self
            .client
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Open-Meteo request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Open-Meteo returned HTTP {}",
                response.status()
            )));
        }

        response.json::<serde_json::Value>().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Open-Meteo JSON parse error: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn glasgow() -> Location {
        Location {
            name: "Glasgow, Scotland".to_string(),
            latitude: 55.864239,
            longitude: -4.251835,
        }
    }

    #[test]
    fn test_payload_shape_from_str() {
        assert_eq!("current".parse::<PayloadShape>(), Ok(PayloadShape::Current));
        assert_eq!(" Legacy ".parse::<PayloadShape>(), Ok(PayloadShape::Legacy));
        assert_eq!(
            "current_weather".parse::<PayloadShape>(),
            Ok(PayloadShape::Legacy)
        );
        assert!("hourly".parse::<PayloadShape>().is_err());
    }

    #[test]
    fn test_forecast_url_current() {
        let client = OpenMeteoClient::new("https://api.open-meteo.com/v1/", "test").unwrap();
        let url = client.forecast_url(&glasgow(), PayloadShape::Current);
        assert!(url.starts_with(
            "https://api.open-meteo.com/v1/forecast?latitude=55.8642&longitude=-4.2518"
        ));
        assert!(url.contains("current=temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m"));
        assert!(url.contains("daily=weather_code,temperature_2m_max,temperature_2m_min"));
        assert!(url.contains("forecast_days=5"));
        assert!(!url.contains("current_weather"));
    }

    #[test]
    fn test_forecast_url_legacy() {
        let client = OpenMeteoClient::new(OPEN_METEO_API_URL, "test").unwrap();
        let url = client.forecast_url(&glasgow(), PayloadShape::Legacy);
        assert_eq!(
            url,
            "https://api.open-meteo.com/v1/forecast?latitude=55.8642&longitude=-4.2518\
             &current_weather=true&temperature_unit=celsius"
        );
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "current_weather": { "temperature": 9.4, "weathercode": 3 }
        });
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("current_weather", "true"))
            .and(header("user-agent", "WidgetTest/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenMeteoClient::new(&server.uri(), "WidgetTest/1.0").unwrap();
        let raw = client.fetch(&glasgow(), PayloadShape::Legacy).await.unwrap();
        assert_eq!(raw, body);
    }

    #[tokio::test]
    async fn test_fetch_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = OpenMeteoClient::new(&server.uri(), "test").unwrap();
        let err = client
            .fetch(&glasgow(), PayloadShape::Current)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExternalServiceError(_)));
        assert!(err.to_string().contains("500"), "got: {}", err);
    }

    #[tokio::test]
    async fn test_fetch_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = OpenMeteoClient::new(&server.uri(), "test").unwrap();
        let err = client
            .fetch(&glasgow(), PayloadShape::Current)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("JSON parse error"), "got: {}", err);
    }
}
