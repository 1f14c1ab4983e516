// ABOUTME: Error types for the pipeline stages
// ABOUTME: Wraps generation failures with the stage that produced them

use std::fmt;

use copilot_ai::GenerationError;
use copilot_prompts::PromptError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The three transformation stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    RequirementAnalysis,
    ImpactAnalysis,
    CodeGeneration,
}

impl StageName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::RequirementAnalysis => "requirement_analysis",
            StageName::ImpactAnalysis => "impact_analysis",
            StageName::CodeGeneration => "code_generation",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("{stage} failed: {source}")]
    Stage {
        stage: StageName,
        #[source]
        source: GenerationError,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),
}

pub type Result<T> = std::result::Result<T, AgentError>;

impl AgentError {
    pub fn stage(stage: StageName, source: GenerationError) -> Self {
        AgentError::Stage { stage, source }
    }

    pub fn stage_name(&self) -> Option<StageName> {
        match self {
            AgentError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub fn generation_error(&self) -> Option<&GenerationError> {
        match self {
            AgentError::Stage { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Raw provider text preserved by a parse or validation failure
    pub fn raw_output(&self) -> Option<&str> {
        self.generation_error().and_then(GenerationError::raw_output)
    }

    pub fn code(&self) -> &'static str {
        match self {
            AgentError::Stage { source, .. } => source.code(),
            AgentError::Serialization(_) => "SERIALIZATION_ERROR",
            AgentError::Prompt(_) => "PROMPT_ERROR",
        }
    }
}
