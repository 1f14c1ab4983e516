// ABOUTME: Third stage: ImpactAssessment to generated source artifacts
// ABOUTME: A skipped assessment short-circuits to the code sentinel without a provider call

use std::sync::Arc;

use copilot_ai::{CancellationToken, StructuredGenerator};
use copilot_models::{CodeGenerationResponse, ImpactAssessment, NO_CODE_SUMMARY};
use copilot_prompts::CODE_GENERATION;
use tracing::info;

use crate::error::{AgentError, Result, StageName};
use crate::outcome::{SkipReason, StageOutcome};

pub struct CodeGenerationStage {
    generator: Arc<StructuredGenerator>,
}

impl CodeGenerationStage {
    pub fn new(generator: Arc<StructuredGenerator>) -> Self {
        Self { generator }
    }

    pub fn sentinel() -> CodeGenerationResponse {
        CodeGenerationResponse::skipped(NO_CODE_SUMMARY)
    }

    pub fn build_prompt(&self, impact: &ImpactAssessment) -> Result<String> {
        let impact = serde_json::to_string_pretty(impact)?;
        Ok(self
            .generator
            .prompts()
            .get_prompt(CODE_GENERATION, &[("impact", &impact)])?)
    }

    pub async fn run(
        &self,
        impact: &ImpactAssessment,
        cancel: &CancellationToken,
    ) -> Result<StageOutcome<CodeGenerationResponse>> {
        if impact.is_skipped() {
            info!("Skipping code generation for an empty impact assessment");
            return Ok(StageOutcome::Skipped {
                reason: SkipReason::NoImpact,
                sentinel: Self::sentinel(),
            });
        }

        let prompt = self.build_prompt(impact)?;
        let response = self
            .generator
            .generate::<CodeGenerationResponse>(prompt, cancel)
            .await
            .map_err(|e| AgentError::stage(StageName::CodeGeneration, e))?;

        info!(files = response.data.files.len(), "Code generation complete");
        Ok(StageOutcome::Proceed(response.data))
    }
}
