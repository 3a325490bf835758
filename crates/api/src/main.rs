//! SOS API server.

use std::sync::Arc;

use api::{app, AppState, Config};
use sos_engine::Engine;
use store::RestStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    info!(addr = %config.addr, store = %config.store.base_url, "Starting SOS API");

    let store = RestStore::new(config.store)?;
    let engine = Engine::new(Arc::new(store), config.tokens);
    let app = app(AppState::new(engine));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("Listening on {}", config.addr);
    axum::serve(listener, app).await?;

    Ok(())
}
