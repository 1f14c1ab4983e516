// ABOUTME: Schema-constrained structured generation over a language-model provider
// ABOUTME: Schema contracts, payload extraction, provider capability, and the generator

pub mod error;
pub mod extract;
pub mod generator;
pub mod provider;
pub mod schema;
pub mod service;

pub use error::{AIServiceError, AIServiceResult, GenerationError, GenerationResult};
pub use extract::extract_payload;
pub use generator::{GeneratorSettings, RetryPolicy, StructuredGenerator};
pub use provider::{
    AIResponse, CompletionRequest, FixedResponseProvider, LlmProvider, ScriptedReply, Usage,
};
pub use schema::{Field, Schema, SchemaContract, SchemaViolation, ViolationKind};
pub use service::MistralProvider;

pub use tokio_util::sync::CancellationToken;
