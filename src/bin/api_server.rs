// API Server Binary Entry Point
//
// Purpose: Start the Axum diagnosis API over the seed-file knowledge base
// Usage: cargo run --features api --bin api_server

use crop_diagnosis_rust::{create_router, AppState, Config};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "crop_diagnosis_rust=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    let config = Config::from_env();

    tracing::info!("Configuration:");
    tracing::info!("  DATA_DIR: {}", config.data_dir);
    tracing::info!("  PORT: {}", config.port);
    tracing::info!("  UPLOAD_DIR: {}", config.upload_dir);
    tracing::info!(
        "  VISION: {}",
        if config.vision.api_key.is_some() { config.vision.model.as_str() } else { "disabled" }
    );
    tracing::info!("  VISION_TIMEOUT: {:?}", config.vision.timeout);

    // Load knowledge base and wire the engine
    let state = AppState::new(&config)?;
    tracing::info!("Application state initialized successfully");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
