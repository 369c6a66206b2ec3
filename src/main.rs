// Weather Widget API v0.1
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod errors;
mod helpers;
mod routes;
mod services;

use config::AppConfig;
use services::open_meteo::OpenMeteoClient;
use services::refresher::Refresher;

/// Weather Widget API OpenAPI document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Weather Widget API",
        version = "0.1.0",
        description = "Current weather and a short forecast for one fixed location. \
            Periodically fetches Open-Meteo, maps WMO weather codes to labels and icon keys, \
            and serves a small rendering-ready view-model. The last good view is retained \
            when a refresh fails.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Weather", description = "Weather view-model for the widget"),
        (name = "Refresher", description = "Background refresher status"),
    ),
    paths(
        routes::health::health_check,
        routes::weather::get_weather,
        routes::weather::refresh_weather,
        routes::refresher::get_refresher_status,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::weather::WeatherResponse,
            services::view_model::WeatherViewModel,
            services::view_model::ForecastDay,
            services::open_meteo::Location,
            services::refresher::WidgetStatus,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_widget_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    tracing::info!(
        "Serving weather for {} ({:?} payload shape)",
        config.location.name,
        config.payload_shape
    );

    let client = OpenMeteoClient::new(&config.open_meteo_base_url, &config.open_meteo_user_agent)
        .expect("Failed to create Open-Meteo client");

    let refresher = Refresher::new(
        client,
        config.location.clone(),
        config.payload_shape,
        config.refresh_interval_secs,
    );

    // Background refresh loop; routes read the state it publishes
    tokio::spawn(refresher.clone().run());

    // CORS: browser widgets on any origin; POST only for on-demand refresh
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any)
        .expose_headers([axum::http::HeaderName::from_static("x-weather-stale")]);

    let app = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .route("/api/v1/weather", get(routes::weather::get_weather))
        .route(
            "/api/v1/weather/refresh",
            post(routes::weather::refresh_weather),
        )
        .route(
            "/api/v1/refresher/status",
            get(routes::refresher::get_refresher_status),
        )
        .with_state(refresher)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_all_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/api/v1/health",
            "/api/v1/weather",
            "/api/v1/weather/refresh",
            "/api/v1/refresher/status",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "Missing {} in {:?}",
                expected,
                paths
            );
        }
    }
}
