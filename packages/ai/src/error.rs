// ABOUTME: Error taxonomy for providers and structured generation
// ABOUTME: Raw provider output travels inside the failure value for later diagnosis

use copilot_prompts::PromptError;
use thiserror::Error;

use crate::schema::SchemaViolation;

/// Provider-level failures (transport, HTTP status, envelope parsing)
#[derive(Debug, Error)]
pub enum AIServiceError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("No API key configured")]
    NoApiKey,

    #[error("Invalid response format")]
    InvalidResponse,
}

pub type AIServiceResult<T> = Result<T, AIServiceError>;

/// Failures of a single structured generation call
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generator is not configured: no provider credential is available")]
    NotConfigured,

    #[error("Provider reply is not a parseable JSON payload: {reason}")]
    MalformedOutput { raw: String, reason: String },

    #[error(
        "Provider reply does not match the {contract} contract: {}",
        summarize_violations(.violations)
    )]
    SchemaValidationFailure {
        contract: &'static str,
        raw: String,
        violations: Vec<SchemaViolation>,
    },

    #[error("Upstream provider error: {0}")]
    UpstreamError(String),

    #[error("Generation was cancelled")]
    Cancelled,

    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),
}

pub type GenerationResult<T> = Result<T, GenerationError>;

impl GenerationError {
    /// Stable machine-readable code for the boundary layers
    pub fn code(&self) -> &'static str {
        match self {
            GenerationError::NotConfigured => "NOT_CONFIGURED",
            GenerationError::MalformedOutput { .. } => "MALFORMED_OUTPUT",
            GenerationError::SchemaValidationFailure { .. } => "SCHEMA_VALIDATION_FAILED",
            GenerationError::UpstreamError(_) => "UPSTREAM_ERROR",
            GenerationError::Cancelled => "CANCELLED",
            GenerationError::Prompt(_) => "PROMPT_ERROR",
        }
    }

    /// The extracted provider text that failed to parse or validate
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            GenerationError::MalformedOutput { raw, .. }
            | GenerationError::SchemaValidationFailure { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// Only transient provider failures are worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerationError::UpstreamError(_))
    }
}

impl From<AIServiceError> for GenerationError {
    fn from(err: AIServiceError) -> Self {
        match err {
            AIServiceError::NoApiKey => GenerationError::NotConfigured,
            other => GenerationError::UpstreamError(other.to_string()),
        }
    }
}

fn summarize_violations(violations: &[SchemaViolation]) -> String {
    const SHOWN: usize = 5;
    let mut summary = violations
        .iter()
        .take(SHOWN)
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    if violations.len() > SHOWN {
        summary.push_str(&format!(" (and {} more)", violations.len() - SHOWN));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ViolationKind;

    #[test]
    fn test_missing_key_maps_to_not_configured() {
        let err: GenerationError = AIServiceError::NoApiKey.into();
        assert!(matches!(err, GenerationError::NotConfigured));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_api_error_maps_to_upstream() {
        let err: GenerationError = AIServiceError::ApiError("API returned 503".into()).into();
        assert_eq!(err.code(), "UPSTREAM_ERROR");
        assert!(err.is_retryable());
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_raw_output_is_exposed() {
        let err = GenerationError::MalformedOutput {
            raw: "not json".into(),
            reason: "expected value".into(),
        };
        assert_eq!(err.raw_output(), Some("not json"));
        assert!(GenerationError::Cancelled.raw_output().is_none());
    }

    #[test]
    fn test_validation_message_lists_violations() {
        let err = GenerationError::SchemaValidationFailure {
            contract: "ImpactAssessment",
            raw: "{}".into(),
            violations: vec![SchemaViolation {
                path: "/overall_risk".into(),
                kind: ViolationKind::MissingField,
            }],
        };
        let message = err.to_string();
        assert!(message.contains("ImpactAssessment"));
        assert!(message.contains("/overall_risk"));
        assert!(!err.is_retryable());
    }
}
