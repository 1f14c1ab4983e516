// ABOUTME: Executes the stage subcommands and renders their JSON output
// ABOUTME: Failed generations leave their raw provider output in the diagnostics directory

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use copilot_agents::{AgentError, Pipeline};
use copilot_ai::CancellationToken;
use copilot_models::{AnalysisResult, ImpactAssessment};
use serde::Serialize;
use tracing::info;

use crate::diagnostics::persist_failure;
use crate::input::parse_json;
use crate::samples::{sample_analysis, sample_impact, SAMPLE_DOCUMENT};

pub struct Runner {
    pipeline: Pipeline,
    diagnostics_dir: PathBuf,
}

impl Runner {
    pub fn new(pipeline: Pipeline, diagnostics_dir: PathBuf) -> Self {
        Self {
            pipeline,
            diagnostics_dir,
        }
    }

    /// Requirement analysis; `input` is the document text
    pub async fn analyze(
        &self,
        input: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let document = document_or_sample(input);
        let result = self
            .pipeline
            .analyze_requirements(&document, cancel)
            .await
            .map_err(|e| self.report(e))?;
        render(&result)
    }

    /// Impact analysis; `input` is AnalysisResult JSON
    pub async fn impact(
        &self,
        input: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let requirements = match input {
            Some(text) => parse_json::<AnalysisResult>(&text, "AnalysisResult")?,
            None => {
                info!("No input file or stdin provided, using sample requirements");
                sample_analysis()
            }
        };
        let outcome = self
            .pipeline
            .assess_impact(&requirements, cancel)
            .await
            .map_err(|e| self.report(e))?;
        if let Some(reason) = outcome.reason() {
            info!(%reason, "Impact analysis skipped");
        }
        render(&outcome.into_inner())
    }

    /// Code generation; `input` is ImpactAssessment JSON
    pub async fn generate(
        &self,
        input: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let impact = match input {
            Some(text) => parse_json::<ImpactAssessment>(&text, "ImpactAssessment")?,
            None => {
                info!("No input file or stdin provided, using sample impact assessment");
                sample_impact()
            }
        };
        let outcome = self
            .pipeline
            .generate_code(&impact, cancel)
            .await
            .map_err(|e| self.report(e))?;
        if let Some(reason) = outcome.reason() {
            info!(%reason, "Code generation skipped");
        }
        render(&outcome.into_inner())
    }

    /// All three stages; `input` is the document text
    pub async fn run(&self, input: Option<String>, cancel: &CancellationToken) -> Result<String> {
        let document = document_or_sample(input);
        let report = self
            .pipeline
            .run(&document, cancel)
            .await
            .map_err(|e| self.report(e))?;
        render(&report)
    }

    fn report(&self, err: AgentError) -> anyhow::Error {
        match persist_failure(&self.diagnostics_dir, &err) {
            Some(path) => {
                let message = format!("raw provider output saved to {}", path.display());
                anyhow!(err).context(message)
            }
            None => anyhow!(err),
        }
    }
}

fn document_or_sample(input: Option<String>) -> String {
    input.unwrap_or_else(|| {
        info!("No file provided, using the sample requirements document");
        SAMPLE_DOCUMENT.to_string()
    })
}

fn render<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
