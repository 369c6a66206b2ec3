use crate::services::open_meteo::{Location, PayloadShape, OPEN_METEO_API_URL};

/// Default location: Glasgow city centre.
const DEFAULT_LATITUDE: f64 = 55.864239;
const DEFAULT_LONGITUDE: f64 = -4.251835;
const DEFAULT_LOCATION_NAME: &str = "Glasgow, Scotland";

/// Default refresh interval (1 hour).
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 3600;
const MIN_REFRESH_INTERVAL_SECS: u64 = 60;
const MAX_REFRESH_INTERVAL_SECS: u64 = 86_400;

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub location: Location,
    pub open_meteo_base_url: String,
    pub open_meteo_user_agent: String,
    /// Which provider payload shape to request.
    pub payload_shape: PayloadShape,
    pub refresh_interval_secs: u64,
}

/// Read and parse an env var, warning and falling back to `default` when
/// the value is present but unparsable.
fn env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            tracing::warn!("Ignoring invalid {}='{}': {}", key, raw, e);
            default
        }),
        Err(_) => default,
    }
}

fn valid_coordinate(value: f64, limit: f64, key: &str, default: f64) -> f64 {
    if (-limit..=limit).contains(&value) {
        value
    } else {
        tracing::warn!("{}={} is out of range, using {}", key, value, default);
        default
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let latitude = valid_coordinate(
            env_or("LATITUDE", DEFAULT_LATITUDE),
            90.0,
            "LATITUDE",
            DEFAULT_LATITUDE,
        );
        let longitude = valid_coordinate(
            env_or("LONGITUDE", DEFAULT_LONGITUDE),
            180.0,
            "LONGITUDE",
            DEFAULT_LONGITUDE,
        );

        Self {
            port: env_or("PORT", 8080),
            location: Location {
                name: std::env::var("LOCATION_NAME")
                    .unwrap_or_else(|_| DEFAULT_LOCATION_NAME.to_string()),
                latitude,
                longitude,
            },
            open_meteo_base_url: std::env::var("OPEN_METEO_BASE_URL")
                .unwrap_or_else(|_| OPEN_METEO_API_URL.to_string()),
            open_meteo_user_agent: std::env::var("OPEN_METEO_USER_AGENT")
                .unwrap_or_else(|_| format!("WeatherWidget/{}", env!("CARGO_PKG_VERSION"))),
            payload_shape: env_or("PAYLOAD_SHAPE", PayloadShape::default()),
            refresh_interval_secs: env_or("REFRESH_INTERVAL_SECS", DEFAULT_REFRESH_INTERVAL_SECS)
                .clamp(MIN_REFRESH_INTERVAL_SECS, MAX_REFRESH_INTERVAL_SECS),
        }
    }
}
