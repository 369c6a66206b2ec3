//! Background refresher for the widget's weather view.
//!
//! Fetches the provider payload on a fixed interval, builds the view-model and
//! publishes it in shared state. Routes read that state; they never talk to
//! the provider themselves, except for an explicit on-demand refresh.
//!
//! Failure policy: the last successfully built view is kept and reported as
//! stale until the next successful refresh. Only when no view was ever built
//! do callers see the "unable to load weather" fallback.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Utc, Weekday};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::services::open_meteo::{Location, OpenMeteoClient, PayloadShape};
use crate::services::view_model::{self, WeatherViewModel};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// In-memory widget state, shared via `Arc<RwLock<>>`.
#[derive(Debug, Clone, Default)]
pub struct WidgetState {
    /// Last successfully built view-model
    pub view: Option<WeatherViewModel>,
    /// When `view` was fetched
    pub fetched_at: Option<DateTime<Utc>>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    /// Error of the most recent attempt; cleared on success
    pub last_error: Option<String>,
    pub next_refresh_at: Option<DateTime<Utc>>,
    pub total_refreshes: u64,
    pub total_failures: u64,
}

/// Shared widget state handle.
pub type SharedWidgetState = Arc<RwLock<WidgetState>>;

/// Refresher status, exposed via the status endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WidgetStatus {
    pub location: Location,
    pub refresh_interval_secs: u64,
    /// Whether a view-model is available
    pub has_weather: bool,
    /// True when the served view predates a failed refresh
    pub stale: bool,
    pub fetched_at: Option<DateTime<Utc>>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub next_refresh_at: Option<DateTime<Utc>>,
    pub total_refreshes: u64,
    pub total_failures: u64,
}

impl WidgetState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A view exists but the latest attempt to replace it failed.
    pub fn is_stale(&self) -> bool {
        self.view.is_some() && self.last_error.is_some()
    }

    fn record_success(&mut self, view: WeatherViewModel, at: DateTime<Utc>) {
        self.view = Some(view);
        self.fetched_at = Some(at);
        self.last_attempt_at = Some(at);
        self.last_error = None;
        self.total_refreshes += 1;
    }

    /// Record a failed attempt. The previous view, if any, is retained.
    fn record_failure(&mut self, err: &AppError, at: DateTime<Utc>) {
        self.last_attempt_at = Some(at);
        self.last_error = Some(err.to_string());
        self.total_refreshes += 1;
        self.total_failures += 1;
    }
}

// ---------------------------------------------------------------------------
// Local calendar
// ---------------------------------------------------------------------------

/// Weekday at the forecast location.
///
/// Uses the payload's `utc_offset_seconds` (present when the request asked for
/// `timezone=auto`), falling back to UTC.
pub fn local_weekday(raw: &serde_json::Value, now: DateTime<Utc>) -> Weekday {
    let offset = raw
        .get("utc_offset_seconds")
        .and_then(serde_json::Value::as_i64)
        .and_then(|secs| i32::try_from(secs).ok())
        .and_then(FixedOffset::east_opt);

    match offset {
        Some(tz) => now.with_timezone(&tz).weekday(),
        None => now.weekday(),
    }
}

// ---------------------------------------------------------------------------
// Refresher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Refresher {
    client: OpenMeteoClient,
    location: Location,
    shape: PayloadShape,
    interval_secs: u64,
    state: SharedWidgetState,
    /// Held across fetch and publish so attempts land in the order they ran.
    refresh_lock: Arc<Mutex<()>>,
}

impl Refresher {
    pub fn new(
        client: OpenMeteoClient,
        location: Location,
        shape: PayloadShape,
        interval_secs: u64,
    ) -> Self {
        Self {
            client,
            location,
            shape,
            interval_secs,
            state: Arc::new(RwLock::new(WidgetState::new())),
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn state(&self) -> SharedWidgetState {
        self.state.clone()
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Snapshot of the current refresher status.
    pub async fn status(&self) -> WidgetStatus {
        let s = self.state.read().await;
        WidgetStatus {
            location: self.location.clone(),
            refresh_interval_secs: self.interval_secs,
            has_weather: s.view.is_some(),
            stale: s.is_stale(),
            fetched_at: s.fetched_at,
            last_attempt_at: s.last_attempt_at,
            last_error: s.last_error.clone(),
            next_refresh_at: s.next_refresh_at,
            total_refreshes: s.total_refreshes,
            total_failures: s.total_failures,
        }
    }

    /// Fetch, build and publish once.
    ///
    /// On failure the error is recorded and returned; the previously published
    /// view stays in place. Concurrent calls (background loop and on-demand
    /// refresh) run one at a time.
    pub async fn refresh_once(&self) -> Result<WeatherViewModel, AppError> {
        let _guard = self.refresh_lock.lock().await;
        let attempt_at = Utc::now();
        let result = self.fetch_and_build(attempt_at).await;

        let mut s = self.state.write().await;
        match &result {
            Ok(view) => {
                s.record_success(view.clone(), attempt_at);
                tracing::debug!(
                    "Refresher: {} {}°C, {} forecast days",
                    view.label,
                    view.temperature_c,
                    view.forecast.len()
                );
            }
            Err(e) => {
                s.record_failure(e, attempt_at);
                tracing::warn!(
                    "Refresher: refresh for {} failed ({} failures so far): {}",
                    self.location.name,
                    s.total_failures,
                    e
                );
            }
        }
        result
    }

    async fn fetch_and_build(&self, now: DateTime<Utc>) -> Result<WeatherViewModel, AppError> {
        let raw = self.client.fetch(&self.location, self.shape).await?;
        let today = local_weekday(&raw, now);
        Ok(view_model::build(&raw, today)?)
    }

    /// Run the refresh loop. Never returns; spawn via `tokio::spawn(refresher.run())`.
    pub async fn run(self) {
        tracing::info!(
            "Refresher started for {} ({:.4}, {:.4}), every {}s",
            self.location.name,
            self.location.latitude,
            self.location.longitude,
            self.interval_secs
        );

        loop {
            // Errors are already logged and recorded by refresh_once.
            let _ = self.refresh_once().await;

            {
                let mut s = self.state.write().await;
                s.next_refresh_at = Some(Utc::now() + Duration::seconds(self.interval_secs as i64));
            }

            tokio::time::sleep(std::time::Duration::from_secs(self.interval_secs)).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
