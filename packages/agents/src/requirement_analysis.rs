// ABOUTME: First stage: raw document text to a 13-category AnalysisResult
// ABOUTME: The generator decides whether the input is a requirements document or a conversation

use std::sync::Arc;

use copilot_ai::{CancellationToken, StructuredGenerator};
use copilot_models::AnalysisResult;
use copilot_prompts::REQUIREMENT_ANALYSIS;
use tracing::{info, warn};

use crate::chunking::{merge_analyses, split_document};
use crate::error::{AgentError, Result, StageName};
use crate::outcome::{SkipReason, StageOutcome};

pub struct RequirementAnalysisStage {
    generator: Arc<StructuredGenerator>,
    max_document_chars: usize,
}

impl RequirementAnalysisStage {
    pub fn new(generator: Arc<StructuredGenerator>, max_document_chars: usize) -> Self {
        Self {
            generator,
            max_document_chars,
        }
    }

    /// Build the user prompt for one document or chunk
    pub fn build_prompt(&self, document: &str) -> Result<String> {
        Ok(self
            .generator
            .prompts()
            .get_prompt(REQUIREMENT_ANALYSIS, &[("document", document)])?)
    }

    /// Analyse `document`.
    ///
    /// A conversational reply is returned as `Skipped` with the reply-only
    /// result as its sentinel, so later stages know not to run.
    pub async fn run(
        &self,
        document: &str,
        cancel: &CancellationToken,
    ) -> Result<StageOutcome<AnalysisResult>> {
        let chunks = split_document(document, self.max_document_chars);
        info!(
            chars = document.chars().count(),
            chunks = chunks.len(),
            "Running requirement analysis"
        );

        let mut parts = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let text = if chunks.len() == 1 {
                (*chunk).to_string()
            } else {
                format!("[Part {} of {}]\n{}", index + 1, chunks.len(), chunk)
            };
            let prompt = self.build_prompt(&text)?;
            let response = self
                .generator
                .generate::<AnalysisResult>(prompt, cancel)
                .await
                .map_err(|e| AgentError::stage(StageName::RequirementAnalysis, e))?;
            parts.push(response.data);
        }

        let result = merge_analyses(parts);

        if result.is_conversational() {
            if let Err(violation) = result.check_exclusivity() {
                warn!(
                    %violation,
                    "Requirement analysis returned both a reply and categories; the reply wins"
                );
            }
            info!("Input classified as conversational");
            let reply = result.conversation_response.unwrap_or_default();
            return Ok(StageOutcome::Skipped {
                reason: SkipReason::ConversationalInput,
                sentinel: AnalysisResult::conversational(reply),
            });
        }

        Ok(StageOutcome::Proceed(result))
    }
}
