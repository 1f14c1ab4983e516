// ABOUTME: Live provider backed by the Mistral chat-completions API
// ABOUTME: Handles request construction, HTTP error classification, and usage extraction

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{AIServiceError, AIServiceResult};
use crate::provider::{AIResponse, CompletionRequest, LlmProvider, Usage};

pub const MISTRAL_API_URL: &str = "https://api.mistral.ai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "mistral-large-latest";
const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    temperature: f32,
    messages: Vec<Message>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[allow(dead_code)]
    id: Option<String>,
    choices: Vec<Choice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl From<ChatUsage> for Usage {
    fn from(usage: ChatUsage) -> Self {
        Usage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        }
    }
}

/// Mistral chat-completions provider
pub struct MistralProvider {
    client: Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl MistralProvider {
    /// Create HTTP client with connect timeout; the overall call deadline is
    /// enforced by the generator
    fn create_client() -> AIServiceResult<Client> {
        Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(AIServiceError::RequestFailed)
    }

    /// Creates a provider. A missing key is allowed; every call then fails
    /// with `NoApiKey` without touching the network.
    pub fn new(api_key: Option<String>) -> AIServiceResult<Self> {
        if api_key.is_none() {
            info!("No Mistral API key provided - generation calls will be rejected");
        }

        Ok(Self {
            client: Self::create_client()?,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            endpoint: MISTRAL_API_URL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        if self.model != DEFAULT_MODEL {
            info!("Using custom Mistral model: {}", self.model);
        }
        self
    }

    /// Point the provider at a different chat-completions endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl LlmProvider for MistralProvider {
    fn name(&self) -> &str {
        "mistral"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, request: CompletionRequest) -> AIServiceResult<AIResponse<String>> {
        let api_key = self.api_key.as_ref().ok_or(AIServiceError::NoApiKey)?;

        let body = ChatRequest {
            model: self.model.clone(),
            temperature: request.temperature,
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: request.system,
                },
                Message {
                    role: "user".to_string(),
                    content: request.prompt,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        info!(
            "Making Mistral API request: model={}, contract={}",
            body.model, request.contract
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!("Mistral API request timed out");
                    AIServiceError::ApiError("Request timed out".to_string())
                } else if e.is_connect() {
                    error!("Failed to connect to Mistral API: {}", e);
                    AIServiceError::ApiError(format!(
                        "Connection failed: {}. Please check your internet connection.",
                        e
                    ))
                } else {
                    error!("Mistral API request failed: {}", e);
                    AIServiceError::RequestFailed(e)
                }
            })?;

        info!("Received response from Mistral API: status={}", response.status());

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Mistral API error: {} - {}", status, error_text);
            return Err(AIServiceError::ApiError(format!(
                "API returned {}: {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AIServiceError::ParseError(e.to_string()))?;

        let text = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(AIServiceError::InvalidResponse)?;

        Ok(AIResponse {
            data: text,
            usage: chat_response.usage.map(Usage::from).unwrap_or_default(),
        })
    }
}
