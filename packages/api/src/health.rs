// ABOUTME: Liveness endpoint reporting service identity and provider readiness
// ABOUTME: Clients use provider_configured to anticipate NOT_CONFIGURED failures

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "copilot-api",
        "version": env!("CARGO_PKG_VERSION"),
        "provider_configured": state.provider_configured(),
    }))
}
