//! WMO weather code classification.
//!
//! Open-Meteo reports sky/precipitation condition as a WMO 4677 code. Every
//! code the provider emits has its own entry in `WEATHER_CODES`; anything else
//! resolves to `UNKNOWN_CODE`. Lookup never fails.

use serde::Serialize;

/// One row of the static code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherCodeEntry {
    /// WMO weather code
    pub code: i64,
    /// Human-readable condition label
    pub label: &'static str,
    /// Opaque icon key handed to the renderer (e.g. "04d")
    pub icon_key: &'static str,
}

const fn entry(code: i64, label: &'static str, icon_key: &'static str) -> WeatherCodeEntry {
    WeatherCodeEntry {
        code,
        label,
        icon_key,
    }
}

/// Fallback for codes absent from the table.
pub const UNKNOWN_CODE: WeatherCodeEntry = entry(-1, "Unknown", "01d");

/// Static code table, sorted by code (required by `classify`'s binary search).
pub const WEATHER_CODES: &[WeatherCodeEntry] = &[
    entry(0, "Clear sky", "01d"),
    entry(1, "Mainly clear", "02d"),
    entry(2, "Partly cloudy", "03d"),
    entry(3, "Overcast", "04d"),
    entry(45, "Fog", "50d"),
    entry(48, "Depositing rime fog", "50d"),
    entry(51, "Light drizzle", "09d"),
    entry(53, "Moderate drizzle", "09d"),
    entry(55, "Dense drizzle", "09d"),
    entry(56, "Light freezing drizzle", "09d"),
    entry(57, "Dense freezing drizzle", "09d"),
    entry(61, "Slight rain", "10d"),
    entry(63, "Moderate rain", "10d"),
    entry(65, "Heavy rain", "10d"),
    entry(66, "Light freezing rain", "13d"),
    entry(67, "Heavy freezing rain", "13d"),
    entry(71, "Slight snow fall", "13d"),
    entry(73, "Moderate snow fall", "13d"),
    entry(75, "Heavy snow fall", "13d"),
    entry(77, "Snow grains", "13d"),
    entry(80, "Slight rain showers", "09d"),
    entry(81, "Moderate rain showers", "09d"),
    entry(82, "Violent rain showers", "09d"),
    entry(85, "Slight snow showers", "13d"),
    entry(86, "Heavy snow showers", "13d"),
    entry(95, "Thunderstorm", "11d"),
    entry(96, "Thunderstorm with slight hail", "11d"),
    entry(99, "Thunderstorm with heavy hail", "11d"),
];

/// Resolve a WMO code to its table entry, or `UNKNOWN_CODE` if absent.
pub fn classify(code: i64) -> &'static WeatherCodeEntry {
    match WEATHER_CODES.binary_search_by_key(&code, |e| e.code) {
        Ok(idx) => &WEATHER_CODES[idx],
        Err(_) => {
            tracing::debug!("Unknown WMO weather code {}, using fallback entry", code);
            &UNKNOWN_CODE
        }
    }
}
