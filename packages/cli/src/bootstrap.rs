// ABOUTME: Builds the provider, generator and pipeline from configuration
// ABOUTME: Provider selection happens here and nowhere else

use std::sync::Arc;

use anyhow::{Context, Result};
use copilot_agents::Pipeline;
use copilot_ai::{
    FixedResponseProvider, GeneratorSettings, LlmProvider, MistralProvider, RetryPolicy,
    StructuredGenerator,
};
use copilot_config::Config;
use copilot_prompts::PromptManager;
use tracing::info;

use crate::samples::offline_replies;

/// The live provider, or canned replies when `offline` is set
pub fn build_provider(config: &Config, offline: bool) -> Result<Arc<dyn LlmProvider>> {
    if offline {
        info!("Offline mode: using canned provider replies");
        let replies = offline_replies().context("Failed to render offline replies")?;
        return Ok(Arc::new(FixedResponseProvider::by_contract(replies)));
    }

    let mut provider = MistralProvider::new(config.api_key.clone())
        .context("Failed to create the Mistral HTTP client")?;
    if let Some(model) = &config.model {
        provider = provider.with_model(model.clone());
    }
    if let Some(url) = &config.api_url {
        provider = provider.with_endpoint(url.clone());
    }

    info!(
        provider = provider.name(),
        model = provider.model(),
        configured = provider.is_configured(),
        "Language model provider ready"
    );
    Ok(Arc::new(provider))
}

pub fn generator_settings(config: &Config) -> GeneratorSettings {
    GeneratorSettings {
        timeout: config.request_timeout,
        retry: RetryPolicy::with_attempts(config.retry_attempts),
        ..GeneratorSettings::default()
    }
}

/// One generator per process, shared by every stage
pub fn build_pipeline(config: &Config, provider: Arc<dyn LlmProvider>) -> Result<Pipeline> {
    let prompts =
        PromptManager::new(config.prompts_dir.clone()).context("Failed to load prompts")?;
    let generator =
        StructuredGenerator::new(provider, Arc::new(prompts), generator_settings(config));
    Ok(Pipeline::new(Arc::new(generator), config.max_document_chars))
}
