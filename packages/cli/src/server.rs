// ABOUTME: Runs the HTTP API until interrupted
// ABOUTME: Binds the configured address and shuts down gracefully on Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use copilot_agents::Pipeline;
use copilot_api::{create_app, AppState};
use copilot_config::Config;
use tracing::{info, warn};

pub async fn run_server(config: &Config, pipeline: Pipeline) -> Result<()> {
    let state = AppState::new(Arc::new(pipeline));
    if !state.provider_configured() {
        warn!("No provider credential: generation endpoints will answer NOT_CONFIGURED");
    }

    let app = create_app(state, config)
        .with_context(|| format!("Invalid CORS origin {}", config.cors_origin))?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);
    info!("CORS origin: {}", config.cors_origin);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
