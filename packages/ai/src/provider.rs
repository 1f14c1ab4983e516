// ABOUTME: Capability interface for a chat-completion provider
// ABOUTME: Includes the fixed-response provider used by tests and offline runs

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AIServiceError, AIServiceResult};

/// One system-plus-user exchange sent to a provider
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Name of the output contract this request is generating
    pub contract: String,
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Usage {
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

#[derive(Debug, Clone)]
pub struct AIResponse<T> {
    pub data: T,
    pub usage: Usage,
}

/// A language-model provider able to answer one completion request
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    /// Whether credentials are present. An unconfigured provider must never be
    /// asked to make a network call.
    fn is_configured(&self) -> bool;

    async fn complete(&self, request: CompletionRequest) -> AIServiceResult<AIResponse<String>>;
}

#[async_trait]
impl LlmProvider for Arc<dyn LlmProvider> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn model(&self) -> &str {
        (**self).model()
    }

    fn is_configured(&self) -> bool {
        (**self).is_configured()
    }

    async fn complete(&self, request: CompletionRequest) -> AIServiceResult<AIResponse<String>> {
        (**self).complete(request).await
    }
}

/// A scripted provider reply
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    /// Fails the call with an API error carrying this message
    Failure(String),
    /// Waits before answering, for exercising timeouts
    Delayed(Duration, String),
}

#[derive(Debug)]
enum Replies {
    Fixed(String),
    Sequence(Mutex<VecDeque<ScriptedReply>>),
    ByContract(HashMap<String, String>),
}

/// Provider double that answers from canned text and records every call
#[derive(Debug)]
pub struct FixedResponseProvider {
    replies: Replies,
    configured: bool,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl FixedResponseProvider {
    /// Always answer with the same text
    pub fn new(reply: impl Into<String>) -> Self {
        Self::with_replies(Replies::Fixed(reply.into()))
    }

    /// Answer each call with the next scripted reply
    pub fn scripted(replies: Vec<ScriptedReply>) -> Self {
        Self::with_replies(Replies::Sequence(Mutex::new(replies.into())))
    }

    /// Answer according to the contract being generated
    pub fn by_contract<I, K, V>(replies: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::with_replies(Replies::ByContract(
            replies
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    /// Behave like a provider without credentials
    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    fn with_replies(replies: Replies) -> Self {
        Self {
            replies,
            configured: true,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }

    fn next_reply(&self, contract: &str) -> ScriptedReply {
        match &self.replies {
            Replies::Fixed(text) => ScriptedReply::Text(text.clone()),
            Replies::Sequence(queue) => queue
                .lock()
                .ok()
                .and_then(|mut q| q.pop_front())
                .unwrap_or_else(|| ScriptedReply::Failure("scripted replies exhausted".into())),
            Replies::ByContract(map) => match map.get(contract) {
                Some(text) => ScriptedReply::Text(text.clone()),
                None => ScriptedReply::Failure(format!("no canned reply for {}", contract)),
            },
        }
    }
}

#[async_trait]
impl LlmProvider for FixedResponseProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    fn model(&self) -> &str {
        "fixed-response"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn complete(&self, request: CompletionRequest) -> AIServiceResult<AIResponse<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!(contract = %request.contract, "Fixed provider answering request");

        let reply = self.next_reply(&request.contract);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request);
        }

        if !self.configured {
            return Err(AIServiceError::NoApiKey);
        }

        let text = match reply {
            ScriptedReply::Text(text) => text,
            ScriptedReply::Failure(message) => return Err(AIServiceError::ApiError(message)),
            ScriptedReply::Delayed(delay, text) => {
                tokio::time::sleep(delay).await;
                text
            }
        };

        Ok(AIResponse {
            data: text,
            usage: Usage::default(),
        })
    }
}
