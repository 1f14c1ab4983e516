// ABOUTME: Second stage: AnalysisResult to ImpactAssessment
// ABOUTME: Conversational input short-circuits to the impact sentinel without a provider call

use std::sync::Arc;

use copilot_ai::{CancellationToken, StructuredGenerator};
use copilot_models::{AnalysisResult, ImpactAssessment, CONVERSATIONAL_JUSTIFICATION};
use copilot_prompts::IMPACT_ANALYSIS;
use tracing::info;

use crate::error::{AgentError, Result, StageName};
use crate::outcome::{SkipReason, StageOutcome};

pub struct ImpactAnalysisStage {
    generator: Arc<StructuredGenerator>,
}

impl ImpactAnalysisStage {
    pub fn new(generator: Arc<StructuredGenerator>) -> Self {
        Self { generator }
    }

    /// Sentinel returned when there is nothing to assess
    pub fn sentinel() -> ImpactAssessment {
        ImpactAssessment::skipped(CONVERSATIONAL_JUSTIFICATION)
    }

    pub fn build_prompt(&self, requirements: &AnalysisResult) -> Result<String> {
        let requirements = serde_json::to_string_pretty(requirements)?;
        Ok(self
            .generator
            .prompts()
            .get_prompt(IMPACT_ANALYSIS, &[("requirements", &requirements)])?)
    }

    pub async fn run(
        &self,
        requirements: &AnalysisResult,
        cancel: &CancellationToken,
    ) -> Result<StageOutcome<ImpactAssessment>> {
        if requirements.is_conversational() {
            info!("Skipping impact analysis for conversational input");
            return Ok(StageOutcome::Skipped {
                reason: SkipReason::ConversationalInput,
                sentinel: Self::sentinel(),
            });
        }

        let prompt = self.build_prompt(requirements)?;
        let response = self
            .generator
            .generate::<ImpactAssessment>(prompt, cancel)
            .await
            .map_err(|e| AgentError::stage(StageName::ImpactAnalysis, e))?;

        info!(
            components = response.data.affected_components.len(),
            risk = %response.data.overall_risk,
            "Impact analysis complete"
        );
        Ok(StageOutcome::Proceed(response.data))
    }
}
