// ABOUTME: Orchestrates the three stages over one shared generator
// ABOUTME: The first stage to skip decides the sentinels for every later stage

use std::sync::Arc;

use copilot_ai::{CancellationToken, StructuredGenerator};
use copilot_models::{AnalysisResult, CodeGenerationResponse, ImpactAssessment};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::code_generation::CodeGenerationStage;
use crate::error::Result;
use crate::impact_analysis::ImpactAnalysisStage;
use crate::outcome::{SkipReason, StageOutcome};
use crate::requirement_analysis::RequirementAnalysisStage;

/// Output of a full pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub requirements: AnalysisResult,
    pub impact: ImpactAssessment,
    pub code: CodeGenerationResponse,
    /// Set when a stage short-circuited the rest of the run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
}

pub struct Pipeline {
    generator: Arc<StructuredGenerator>,
    requirements: RequirementAnalysisStage,
    impact: ImpactAnalysisStage,
    code: CodeGenerationStage,
}

impl Pipeline {
    pub fn new(generator: Arc<StructuredGenerator>, max_document_chars: usize) -> Self {
        Self {
            requirements: RequirementAnalysisStage::new(generator.clone(), max_document_chars),
            impact: ImpactAnalysisStage::new(generator.clone()),
            code: CodeGenerationStage::new(generator.clone()),
            generator,
        }
    }

    pub fn generator(&self) -> &StructuredGenerator {
        &self.generator
    }

    pub async fn analyze_requirements(
        &self,
        document: &str,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult> {
        Ok(self.requirements.run(document, cancel).await?.into_inner())
    }

    pub async fn assess_impact(
        &self,
        requirements: &AnalysisResult,
        cancel: &CancellationToken,
    ) -> Result<StageOutcome<ImpactAssessment>> {
        self.impact.run(requirements, cancel).await
    }

    pub async fn generate_code(
        &self,
        impact: &ImpactAssessment,
        cancel: &CancellationToken,
    ) -> Result<StageOutcome<CodeGenerationResponse>> {
        self.code.run(impact, cancel).await
    }

    /// Run all three stages; any stage failure aborts the run
    pub async fn run(&self, document: &str, cancel: &CancellationToken) -> Result<PipelineReport> {
        let requirements = match self.requirements.run(document, cancel).await? {
            StageOutcome::Proceed(requirements) => requirements,
            StageOutcome::Skipped { reason, sentinel } => {
                return Ok(Self::short_circuit(
                    sentinel,
                    ImpactAnalysisStage::sentinel(),
                    reason,
                ));
            }
        };

        let impact = match self.impact.run(&requirements, cancel).await? {
            StageOutcome::Proceed(impact) => impact,
            StageOutcome::Skipped { reason, sentinel } => {
                return Ok(Self::short_circuit(requirements, sentinel, reason));
            }
        };

        let code = self.code.run(&impact, cancel).await?;
        let skipped = code.reason();
        if let Some(reason) = skipped {
            info!(%reason, "Pipeline finished without code");
        } else {
            info!("Pipeline finished");
        }

        Ok(PipelineReport {
            requirements,
            impact,
            code: code.into_inner(),
            skipped,
        })
    }

    fn short_circuit(
        requirements: AnalysisResult,
        impact: ImpactAssessment,
        reason: SkipReason,
    ) -> PipelineReport {
        info!(%reason, "Pipeline short-circuited");
        PipelineReport {
            requirements,
            impact,
            code: CodeGenerationStage::sentinel(),
            skipped: Some(reason),
        }
    }
}
