// ABOUTME: HTTP request handlers for the three stages and the full pipeline
// ABOUTME: Each request gets its own cancellation token; skipped stages answer with sentinels

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use copilot_agents::PipelineReport;
use copilot_ai::CancellationToken;
use copilot_models::{AnalysisResult, CodeGenerationResponse, ImpactAssessment};
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiResult, AppError};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

fn require_text(payload: Result<Json<TextRequest>, JsonRejection>) -> ApiResult<String> {
    let Json(request) = payload?;
    if request.text.trim().is_empty() {
        return Err(AppError::validation("text must not be empty"));
    }
    Ok(request.text)
}

pub async fn analyze_requirements(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> ApiResult<Json<AnalysisResult>> {
    let text = require_text(payload)?;
    info!(chars = text.chars().count(), "Analyzing requirements");

    let cancel = CancellationToken::new();
    let result = state.pipeline.analyze_requirements(&text, &cancel).await?;
    Ok(Json(result))
}

pub async fn analyze_impact(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisResult>, JsonRejection>,
) -> ApiResult<Json<ImpactAssessment>> {
    let Json(requirements) = payload?;
    info!(
        requirements = requirements.functional_requirements.len(),
        "Analyzing impact"
    );

    let cancel = CancellationToken::new();
    let outcome = state.pipeline.assess_impact(&requirements, &cancel).await?;
    Ok(Json(outcome.into_inner()))
}

pub async fn generate_code(
    State(state): State<AppState>,
    payload: Result<Json<ImpactAssessment>, JsonRejection>,
) -> ApiResult<Json<CodeGenerationResponse>> {
    let Json(impact) = payload?;
    info!(
        components = impact.affected_components.len(),
        "Generating code"
    );

    let cancel = CancellationToken::new();
    let outcome = state.pipeline.generate_code(&impact, &cancel).await?;
    Ok(Json(outcome.into_inner()))
}

pub async fn run_pipeline(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> ApiResult<Json<PipelineReport>> {
    let text = require_text(payload)?;
    info!(chars = text.chars().count(), "Running full pipeline");

    let cancel = CancellationToken::new();
    let report = state.pipeline.run(&text, &cancel).await?;
    Ok(Json(report))
}
