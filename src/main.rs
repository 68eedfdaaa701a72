mod analytics;
mod config;
mod data;
mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{Config, EnvConfig};
use data::provider::{AnalyticsDataProvider, HttpDataProvider};
use routes::{
    correlation::correlation_handler,
    docs::{docs_handler, openapi_handler, root_handler},
    forecast::forecast_handler,
    health::health_handler,
};

pub struct AppState {
    pub provider: Arc<dyn AnalyticsDataProvider>,
    pub window_days: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Vida analytics engine starting...");

    let config = if std::path::Path::new("config.toml").exists() {
        Config::load("config.toml")?
    } else {
        Config::default()
    };
    let env_config = EnvConfig::load()?;

    let base_url = env_config
        .provider_base_url
        .unwrap_or_else(|| config.provider.base_url.clone());
    tracing::info!("Upstream data provider: {}", base_url);
    tracing::info!(
        "Fetch window: {} days, timeout: {}s",
        config.provider.window_days,
        config.provider.timeout_secs
    );

    let provider = HttpDataProvider::new(base_url, config.provider.timeout_secs)?;
    let state = Arc::new(AppState {
        provider: Arc::new(provider),
        window_days: config.provider.window_days,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/docs", get(docs_handler))
        .route("/openapi.json", get(openapi_handler))
        .route("/analytics/correlation", post(correlation_handler))
        .route("/analytics/forecast", post(forecast_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let port = env_config.port.unwrap_or(config.server.port);
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::UNSPECIFIED, port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    tracing::info!(port = %port, "server listening");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
