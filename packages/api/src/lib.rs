// ABOUTME: HTTP API layer and routing for the requirements copilot
// ABOUTME: Builds the axum router with CORS, request tracing and an optional static frontend

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use copilot_agents::Pipeline;
use copilot_config::Config;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;

pub mod error;
pub mod handlers;
pub mod health;

pub use error::{ApiResult, AppError};

/// Shared handler state; one pipeline (and one generator) per process
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    pub fn provider_configured(&self) -> bool {
        self.pipeline.generator().provider().is_configured()
    }
}

/// Routes only, without middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .route(
            "/api/analyze/requirements",
            post(handlers::analyze_requirements),
        )
        .route("/api/analyze/impact", post(handlers::analyze_impact))
        .route("/api/generate/code", post(handlers::generate_code))
        .route("/api/pipeline/run", post(handlers::run_pipeline))
        .with_state(state)
}

/// Full application: routes, CORS, tracing, the body limit and the static frontend fallback
pub fn create_app(
    state: AppState,
    config: &Config,
) -> Result<Router, axum::http::header::InvalidHeaderValue> {
    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let mut app = create_router(state).layer(DefaultBodyLimit::max(config.max_body_bytes));

    if let Some(dir) = &config.static_dir {
        info!(dir = %dir.display(), "Serving static frontend");
        app = app.fallback_service(ServeDir::new(dir));
    }

    Ok(app.layer(TraceLayer::new_for_http()).layer(cors))
}
