//! # mail2quip
//!
//! Inbound email handler that creates Quip messages from emails. The mail
//! provider posts each received email to `/mail` as a form; the recipient
//! address carries the access token (and optionally a thread id).

mod config;
mod handlers;

use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(log_level))
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    info!("mail2quip listening on {}", config.bind_address);

    let app = Router::new()
        .route("/", get(handlers::home))
        .route("/mail", post(handlers::receive_mail))
        .with_state(config.clone());

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
