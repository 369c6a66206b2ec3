//! Open-Meteo payload → widget view-model.
//!
//! The provider answers "current weather" in one of two shapes:
//!
//! - **current** (`current` + optional `daily` object): temperature, humidity,
//!   wind and a multi-day forecast.
//! - **legacy** (`current_weather` object): temperature and weather code only.
//!
//! `ProviderPayload::detect` resolves the shape once at the boundary and
//! normalises both into an `Observation`; everything after that is
//! shape-agnostic. The whole module is pure: no I/O, no clock, no shared state.

use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::helpers::{json_to_code, opt_round_to_i32, round_to_i32};
use crate::services::weather_codes::classify;

/// Maximum number of forecast days in a view-model (today included).
pub const MAX_FORECAST_DAYS: usize = 5;

/// Abbreviations indexed by days-from-Sunday.
const WEEKDAY_ABBREVIATIONS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// A required field is missing or has the wrong type.
    #[error("Malformed weather payload: {0}")]
    MalformedPayload(String),
}

// ---------------------------------------------------------------------------
// View-model consumed by the renderer
// ---------------------------------------------------------------------------

/// Rendering-ready weather summary.
///
/// `humidity_pct` and `wind_kmh` are `null` when the provider did not report
/// them, so a renderer can tell "no data" apart from zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct WeatherViewModel {
    /// Current temperature in Celsius, rounded
    pub temperature_c: i32,
    /// Condition label (e.g. "Overcast")
    pub label: String,
    /// Opaque icon key (e.g. "04d")
    pub icon_key: String,
    /// Relative humidity in percent, rounded
    pub humidity_pct: Option<i32>,
    /// Wind speed in km/h, rounded
    pub wind_kmh: Option<i32>,
    /// Up to five days, starting with today
    pub forecast: Vec<ForecastDay>,
}

/// One day of the short forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ForecastDay {
    /// "Today" for the first day, otherwise a weekday abbreviation ("Mon")
    pub day_label: String,
    /// Condition label
    pub label: String,
    /// Opaque icon key
    pub icon_key: String,
    /// Daily maximum in Celsius, rounded
    pub high_c: i32,
    /// Daily minimum in Celsius, rounded
    pub low_c: i32,
}

// ---------------------------------------------------------------------------
// Provider payload shapes
// ---------------------------------------------------------------------------

/// `current` block of the current shape.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentBlock {
    temperature_2m: f64,
    #[serde(deserialize_with = "de_code")]
    weather_code: i64,
    #[serde(default)]
    relative_humidity_2m: Option<f64>,
    #[serde(default)]
    wind_speed_10m: Option<f64>,
}

/// `daily` block of the current shape. Arrays are index-aligned by day.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyBlock {
    #[serde(default, deserialize_with = "de_opt_codes")]
    weather_code: Vec<Option<i64>>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
}

/// `current_weather` block of the legacy shape.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyBlock {
    temperature: f64,
    #[serde(deserialize_with = "de_code")]
    weathercode: i64,
}

/// The two mutually exclusive payload shapes.
#[derive(Debug, Clone)]
pub enum ProviderPayload {
    Current {
        current: CurrentBlock,
        daily: Option<DailyBlock>,
    },
    Legacy(LegacyBlock),
}

fn de_code<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    json_to_code(&v).ok_or_else(|| serde::de::Error::custom(format!("invalid weather code {}", v)))
}

fn de_opt_codes<'de, D>(deserializer: D) -> Result<Vec<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    values
        .iter()
        .map(|v| {
            if v.is_null() {
                Ok(None)
            } else {
                json_to_code(v).map(Some).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid weather code {}", v))
                })
            }
        })
        .collect()
}

fn malformed(block: &str, err: impl std::fmt::Display) -> BuildError {
    BuildError::MalformedPayload(format!("`{}`: {}", block, err))
}

impl ProviderPayload {
    /// Detect the payload shape by key presence and parse its blocks.
    ///
    /// `current` takes precedence when both keys are present.
    pub fn detect(raw: &serde_json::Value) -> Result<Self, BuildError> {
        let obj = raw.as_object().ok_or_else(|| {
            BuildError::MalformedPayload("payload is not a JSON object".to_string())
        })?;

        if let Some(current) = obj.get("current") {
            let current = CurrentBlock::deserialize(current).map_err(|e| malformed("current", e))?;
            let daily = match obj.get("daily") {
                None | Some(serde_json::Value::Null) => None,
                Some(d) => Some(DailyBlock::deserialize(d).map_err(|e| malformed("daily", e))?),
            };
            return Ok(Self::Current { current, daily });
        }

        if let Some(legacy) = obj.get("current_weather") {
            let legacy =
                LegacyBlock::deserialize(legacy).map_err(|e| malformed("current_weather", e))?;
            return Ok(Self::Legacy(legacy));
        }

        Err(BuildError::MalformedPayload(
            "payload has neither `current` nor `current_weather`".to_string(),
        ))
    }

    /// Normalise either shape into a shape-agnostic observation.
    fn into_observation(self) -> Observation {
        match self {
            Self::Current { current, daily } => Observation {
                temperature_c: current.temperature_2m,
                weather_code: current.weather_code,
                humidity_pct: current.relative_humidity_2m,
                wind_kmh: current.wind_speed_10m,
                days: daily.map(daily_readings).unwrap_or_default(),
            },
            Self::Legacy(legacy) => Observation {
                temperature_c: legacy.temperature,
                weather_code: legacy.weathercode,
                humidity_pct: None,
                wind_kmh: None,
                days: Vec::new(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Shape-agnostic assembly
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Observation {
    temperature_c: f64,
    weather_code: i64,
    humidity_pct: Option<f64>,
    wind_kmh: Option<f64>,
    days: Vec<DailyReading>,
}

#[derive(Debug, Clone, Copy)]
struct DailyReading {
    weather_code: i64,
    max_c: f64,
    min_c: f64,
}

/// Zip the daily arrays, stopping at the shortest array or the first day
/// with a missing value. Capped at `MAX_FORECAST_DAYS`.
fn daily_readings(daily: DailyBlock) -> Vec<DailyReading> {
    daily
        .weather_code
        .iter()
        .zip(&daily.temperature_2m_max)
        .zip(&daily.temperature_2m_min)
        .take(MAX_FORECAST_DAYS)
        .map_while(|((code, max), min)| {
            Some(DailyReading {
                weather_code: (*code)?,
                max_c: (*max)?,
                min_c: (*min)?,
            })
        })
        .collect()
}

/// Label for the forecast day `offset` days after `today`.
pub fn day_label(today: Weekday, offset: usize) -> &'static str {
    if offset == 0 {
        return "Today";
    }
    let idx = (today.num_days_from_sunday() as usize + offset) % 7;
    WEEKDAY_ABBREVIATIONS[idx]
}

fn require_rounded(v: f64, field: &str) -> Result<i32, BuildError> {
    round_to_i32(v).ok_or_else(|| {
        BuildError::MalformedPayload(format!("`{}` is not a finite number", field))
    })
}

fn assemble(obs: Observation, today: Weekday) -> Result<WeatherViewModel, BuildError> {
    let entry = classify(obs.weather_code);

    let forecast = obs
        .days
        .iter()
        .enumerate()
        .map(|(i, day)| {
            let day_entry = classify(day.weather_code);
            Ok(ForecastDay {
                day_label: day_label(today, i).to_string(),
                label: day_entry.label.to_string(),
                icon_key: day_entry.icon_key.to_string(),
                high_c: require_rounded(day.max_c, "temperature_2m_max")?,
                low_c: require_rounded(day.min_c, "temperature_2m_min")?,
            })
        })
        .collect::<Result<Vec<_>, BuildError>>()?;

    Ok(WeatherViewModel {
        temperature_c: require_rounded(obs.temperature_c, "temperature")?,
        label: entry.label.to_string(),
        icon_key: entry.icon_key.to_string(),
        humidity_pct: opt_round_to_i32(obs.humidity_pct),
        wind_kmh: opt_round_to_i32(obs.wind_kmh),
        forecast,
    })
}

/// Build the view-model from a raw provider payload.
///
/// `today` is the weekday at the forecast location; it only affects
/// `forecast[i].day_label` for `i > 0`.
pub fn build(raw: &serde_json::Value, today: Weekday) -> Result<WeatherViewModel, BuildError> {
    let payload = ProviderPayload::detect(raw)?;
    assemble(payload.into_observation(), today)
}
