// ABOUTME: API error type and its JSON error envelope
// ABOUTME: Maps generation failures to stable codes and HTTP statuses

use std::collections::HashMap;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use copilot_agents::AgentError;
use copilot_ai::GenerationError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Longest provider excerpt echoed back to the client
const RAW_EXCERPT_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::Validation(rejection.body_text())
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorDetail,
    request_id: String,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<HashMap<String, String>>,
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    fn to_status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            AppError::Agent(err) => match err.generation_error() {
                Some(GenerationError::NotConfigured) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "NOT_CONFIGURED")
                }
                Some(GenerationError::UpstreamError(_)) => {
                    (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR")
                }
                Some(GenerationError::MalformedOutput { .. }) => {
                    (StatusCode::BAD_GATEWAY, "MALFORMED_OUTPUT")
                }
                Some(GenerationError::SchemaValidationFailure { .. }) => {
                    (StatusCode::BAD_GATEWAY, "SCHEMA_VALIDATION_FAILED")
                }
                Some(GenerationError::Cancelled) => (StatusCode::SERVICE_UNAVAILABLE, "CANCELLED"),
                Some(GenerationError::Prompt(_)) | None => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
        }
    }

    /// Client-facing message; upstream detail stays in the logs
    fn to_user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => format!("Validation failed: {}", msg),
            AppError::PayloadTooLarge(_) => "The request body is too large".to_string(),
            AppError::Agent(err) => match err.generation_error() {
                Some(GenerationError::NotConfigured) => {
                    "The language model provider is not configured".to_string()
                }
                Some(GenerationError::UpstreamError(_)) => {
                    "The language model provider request failed".to_string()
                }
                Some(GenerationError::MalformedOutput { .. }) => {
                    "The language model reply was not valid JSON".to_string()
                }
                Some(GenerationError::SchemaValidationFailure { contract, .. }) => {
                    format!("The language model reply did not match the {} contract", contract)
                }
                Some(GenerationError::Cancelled) => "The request was cancelled".to_string(),
                Some(GenerationError::Prompt(_)) | None => {
                    "An internal server error occurred".to_string()
                }
            },
        }
    }

    fn details(&self) -> Option<HashMap<String, String>> {
        let AppError::Agent(err) = self else {
            return None;
        };
        let mut details = HashMap::new();
        if let Some(stage) = err.stage_name() {
            details.insert("stage".to_string(), stage.to_string());
        }
        if let Some(GenerationError::SchemaValidationFailure { violations, .. }) =
            err.generation_error()
        {
            let summary = violations
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            details.insert("violations".to_string(), summary);
        }
        if let Some(raw) = err.raw_output() {
            details.insert("raw_excerpt".to_string(), excerpt(raw).to_string());
        }
        (!details.is_empty()).then_some(details)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let (status_code, error_code) = self.to_status_and_code();

        match &self {
            AppError::Validation(_) | AppError::PayloadTooLarge(_) => {
                info!(
                    request_id = %request_id,
                    error_code = %error_code,
                    error = %self,
                    "API error response"
                );
            }
            AppError::Agent(err) if status_code == StatusCode::INTERNAL_SERVER_ERROR => {
                error!(request_id = %request_id, error = %err, "Internal server error occurred");
            }
            AppError::Agent(err) => {
                warn!(
                    request_id = %request_id,
                    error_code = %error_code,
                    error = %err,
                    raw_output = err.raw_output().unwrap_or_default(),
                    "Generation failed"
                );
            }
        }

        let error_response = ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: error_code.to_string(),
                message: self.to_user_message(),
                details: self.details(),
            },
            request_id,
        };

        (status_code, Json(error_response)).into_response()
    }
}

pub type ApiResult<T> = Result<T, AppError>;

fn excerpt(text: &str) -> &str {
    match text.char_indices().nth(RAW_EXCERPT_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
