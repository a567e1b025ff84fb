//! # quip-webhooks
//!
//! Inbound webhook server that posts service activity to a Quip thread.
//! GitHub, Crashlytics and PagerDuty payloads arrive on `/hook`; the root
//! serves the configuration page.

mod config;
mod handlers;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use config::Config;
use handlers::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(log_level))
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    info!("quip-webhooks listening on {}", config.bind_address);

    let state = AppState::new(config.clone());
    let app = Router::new()
        .route("/", get(handlers::home))
        .route("/hook", get(handlers::hook_redirect).post(handlers::hook))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
