// ABOUTME: Structured generator: schema instruction, provider call, extraction, validation
// ABOUTME: Bounded by a per-call timeout, a cancellation token, and upstream-only retry

use std::sync::Arc;
use std::time::Duration;

use copilot_prompts::{PromptManager, STRUCTURED_OUTPUT};
use rand::Rng;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{GenerationError, GenerationResult};
use crate::extract::extract_payload;
use crate::provider::{AIResponse, CompletionRequest, LlmProvider};
use crate::schema::{SchemaContract, SchemaViolation};

const DEFAULT_TEMPERATURE: f32 = 0.2;
const MAX_LOGGED_CHARS: usize = 500;

/// Bounded exponential backoff with jitter for transient provider failures
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no retry
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn with_attempts(attempts: u32) -> Self {
        Self {
            max_attempts: attempts.max(1),
            ..Self::default()
        }
    }

    /// Delay before the attempt following `attempt` (1-based): exponential
    /// growth capped at `max_delay`, then a random point in its upper half
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let ceiling = self
            .base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay);
        let ceiling_ms = ceiling.as_millis() as u64;
        if ceiling_ms == 0 {
            return ceiling;
        }
        let jittered = rand::thread_rng().gen_range(ceiling_ms / 2..=ceiling_ms);
        Duration::from_millis(jittered)
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub temperature: f32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            retry: RetryPolicy::default(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Turns a prompt into a validated typed object through an injected provider.
/// Immutable after construction; share one instance per process.
pub struct StructuredGenerator {
    provider: Arc<dyn LlmProvider>,
    prompts: Arc<PromptManager>,
    settings: GeneratorSettings,
}

impl StructuredGenerator {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        prompts: Arc<PromptManager>,
        settings: GeneratorSettings,
    ) -> Self {
        Self {
            provider,
            prompts,
            settings,
        }
    }

    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    pub fn prompts(&self) -> &PromptManager {
        &self.prompts
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// The system instruction embedding `T`'s schema
    pub fn system_instruction<T: SchemaContract>(&self) -> GenerationResult<String> {
        let schema =
            serde_json::to_string_pretty(&T::schema().to_json_schema()).map_err(|e| {
                GenerationError::UpstreamError(format!("schema rendering failed: {}", e))
            })?;
        Ok(self
            .prompts
            .get_prompt(STRUCTURED_OUTPUT, &[("contract", T::NAME), ("schema", &schema)])?)
    }

    /// Generate a `T` from `prompt`
    pub async fn generate<T: SchemaContract>(
        &self,
        prompt: String,
        cancel: &CancellationToken,
    ) -> GenerationResult<AIResponse<T>> {
        if !self.provider.is_configured() {
            warn!(
                provider = self.provider.name(),
                contract = T::NAME,
                "Refusing generation: provider has no credentials"
            );
            return Err(GenerationError::NotConfigured);
        }

        let request = CompletionRequest {
            contract: T::NAME.to_string(),
            system: self.system_instruction::<T>()?,
            prompt,
            temperature: self.settings.temperature,
        };

        let reply = self.complete_with_retry(request, cancel).await?;
        let data = Self::parse_reply::<T>(&reply.data)?;

        info!(
            contract = T::NAME,
            tokens = reply.usage.total_tokens(),
            "Structured generation succeeded"
        );

        Ok(AIResponse {
            data,
            usage: reply.usage,
        })
    }

    /// Extract, parse, and validate a raw provider reply
    pub fn parse_reply<T: SchemaContract>(raw: &str) -> GenerationResult<T> {
        let payload = extract_payload(raw);
        debug!(
            contract = T::NAME,
            "Extracted payload (first {} chars): {}",
            MAX_LOGGED_CHARS,
            truncate(payload, MAX_LOGGED_CHARS)
        );

        let value: Value = serde_json::from_str(payload).map_err(|e| {
            error!(
                contract = T::NAME,
                "JSON parsing failed: {}. Snippet: {}",
                e,
                truncate(payload, MAX_LOGGED_CHARS)
            );
            GenerationError::MalformedOutput {
                raw: payload.to_string(),
                reason: e.to_string(),
            }
        })?;

        if let Err(violations) = T::schema().validate(&value) {
            error!(
                contract = T::NAME,
                violations = violations.len(),
                "Payload failed schema validation"
            );
            return Err(GenerationError::SchemaValidationFailure {
                contract: T::NAME,
                raw: payload.to_string(),
                violations,
            });
        }

        serde_json::from_value::<T>(value).map_err(|e| {
            error!(contract = T::NAME, "Payload could not be bound: {}", e);
            GenerationError::SchemaValidationFailure {
                contract: T::NAME,
                raw: payload.to_string(),
                violations: vec![SchemaViolation::deserialization(e.to_string())],
            }
        })
    }

    async fn complete_with_retry(
        &self,
        request: CompletionRequest,
        cancel: &CancellationToken,
    ) -> GenerationResult<AIResponse<String>> {
        let policy = &self.settings.retry;
        let mut attempt = 1;

        loop {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
                result = tokio::time::timeout(
                    self.settings.timeout,
                    self.provider.complete(request.clone()),
                ) => result,
            };

            let err = match outcome {
                Ok(Ok(reply)) => return Ok(reply),
                Ok(Err(e)) => GenerationError::from(e),
                Err(_) => GenerationError::UpstreamError(format!(
                    "Provider call timed out after {}s",
                    self.settings.timeout.as_secs_f32()
                )),
            };

            if !err.is_retryable() || attempt >= policy.max_attempts {
                error!(
                    contract = %request.contract,
                    attempt,
                    "Provider call failed: {}",
                    err
                );
                return Err(err);
            }

            let delay = policy.delay_after(attempt);
            warn!(
                contract = %request.contract,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Transient provider failure, retrying: {}",
                err
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
            attempt += 1;
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FixedResponseProvider, ScriptedReply};
    use crate::schema::{Field, Schema};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Verdict {
        label: String,
        #[serde(default)]
        score: u32,
    }

    impl SchemaContract for Verdict {
        const NAME: &'static str = "Verdict";

        fn schema() -> Schema {
            Schema::object(vec![
                Field::required("label", "Outcome label", Schema::string()),
                Field::optional("score", "", Schema::non_negative_integer(), 0.into()),
            ])
        }
    }

    fn generator(
        provider: Arc<FixedResponseProvider>,
        settings: GeneratorSettings,
    ) -> StructuredGenerator {
        StructuredGenerator::new(
            provider,
            Arc::new(PromptManager::builtin().unwrap()),
            settings,
        )
    }

    fn fast_settings() -> GeneratorSettings {
        GeneratorSettings {
            timeout: Duration::from_secs(5),
            retry: RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
            },
            temperature: 0.0,
        }
    }

    #[test]
    fn test_system_instruction_embeds_schema() {
        let gen = generator(Arc::new(FixedResponseProvider::new("{}")), fast_settings());
        let instruction = gen.system_instruction::<Verdict>().unwrap();
        assert!(instruction.contains("Verdict"));
        assert!(instruction.contains("\"label\""));
        assert!(instruction.contains("\"required\""));
    }

    #[tokio::test]
    async fn test_generates_validated_object() {
        let provider = Arc::new(FixedResponseProvider::new("```json\n{\"label\": \"ok\"}\n```"));
        let gen = generator(provider.clone(), fast_settings());

        let response = gen
            .generate::<Verdict>("judge this".into(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            response.data,
            Verdict {
                label: "ok".into(),
                score: 0
            }
        );
        let sent = provider.last_request().unwrap();
        assert_eq!(sent.contract, "Verdict");
        assert_eq!(sent.prompt, "judge this");
        assert!(sent.system.contains("JSON Schema"));
    }

    #[tokio::test]
    async fn test_free_text_is_malformed_and_raw_is_kept() {
        let provider = Arc::new(FixedResponseProvider::new("I am not sure what you mean."));
        let gen = generator(provider.clone(), fast_settings());

        let err = gen
            .generate::<Verdict>("x".into(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::MalformedOutput { .. }));
        assert_eq!(err.raw_output(), Some("I am not sure what you mean."));
        // Deterministic failures are not retried
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_wrong_shape_is_validation_failure() {
        let provider = Arc::new(FixedResponseProvider::new("{\"score\": -1}"));
        let gen = generator(provider.clone(), fast_settings());

        let err = gen
            .generate::<Verdict>("x".into(), &CancellationToken::new())
            .await
            .unwrap_err();

        match &err {
            GenerationError::SchemaValidationFailure { violations, raw, .. } => {
                assert_eq!(violations.len(), 2);
                assert_eq!(raw, "{\"score\": -1}");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(provider.call_count(), 1);
    }

    #[test]
    fn test_out_of_range_integer_fails_binding() {
        let err = StructuredGenerator::parse_reply::<Verdict>(
            "{\"label\": \"a\", \"score\": 99999999999}",
        )
        .unwrap_err();
        assert_eq!(err.code(), "SCHEMA_VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn test_not_configured_skips_provider() {
        let provider = Arc::new(FixedResponseProvider::new("{}").unconfigured());
        let gen = generator(provider.clone(), fast_settings());

        let err = gen
            .generate::<Verdict>("x".into(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::NotConfigured));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_retried() {
        let provider = Arc::new(FixedResponseProvider::scripted(vec![
            ScriptedReply::Failure("API returned 503".into()),
            ScriptedReply::Failure("API returned 502".into()),
            ScriptedReply::Text("{\"label\": \"third time\"}".into()),
        ]));
        let gen = generator(provider.clone(), fast_settings());

        let response = gen
            .generate::<Verdict>("x".into(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.data.label, "third time");
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let provider = Arc::new(FixedResponseProvider::scripted(vec![
            ScriptedReply::Failure("down".into()),
            ScriptedReply::Failure("down".into()),
            ScriptedReply::Failure("down".into()),
            ScriptedReply::Text("{\"label\": \"too late\"}".into()),
        ]));
        let gen = generator(provider.clone(), fast_settings());

        let err = gen
            .generate::<Verdict>("x".into(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::UpstreamError(_)));
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_timeout_surfaces_as_upstream_error() {
        let provider = Arc::new(FixedResponseProvider::scripted(vec![ScriptedReply::Delayed(
            Duration::from_secs(30),
            "{\"label\": \"late\"}".into(),
        )]));
        let settings = GeneratorSettings {
            timeout: Duration::from_millis(50),
            retry: RetryPolicy::none(),
            temperature: 0.0,
        };
        let gen = generator(provider, settings);

        let err = gen
            .generate::<Verdict>("x".into(), &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            GenerationError::UpstreamError(message) => assert!(message.contains("timed out")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancellation_stops_the_call() {
        let provider = Arc::new(FixedResponseProvider::scripted(vec![ScriptedReply::Delayed(
            Duration::from_secs(30),
            "{}".into(),
        )]));
        let gen = generator(provider, fast_settings());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = gen.generate::<Verdict>("x".into(), &cancel).await.unwrap_err();
        assert!(matches!(err, GenerationError::Cancelled));
    }

    #[test]
    fn test_retry_delay_is_bounded() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
        };
        let first = policy.delay_after(1);
        assert!(first >= Duration::from_millis(50) && first <= Duration::from_millis(100));
        let late = policy.delay_after(10);
        assert!(late >= Duration::from_millis(150) && late <= Duration::from_millis(300));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
