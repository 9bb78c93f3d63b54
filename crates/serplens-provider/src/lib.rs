//! Model-completion adapters for the audit and assistant paths.
//!
//! Two interchangeable backends (Gemini, OpenAI) behind one
//! [`CompletionService`] trait. Both clients take an injectable base URL
//! so tests can point them at a wiremock server.

mod error;
mod gemini;
mod openai;
mod types;

pub use error::ProviderError;
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
pub use types::{AuditOutcome, AuditRequest, DocumentPayload};

use serplens_core::{ChatMessage, ModelProvider};

/// A backend that can service one audit or one assistant turn.
#[allow(async_fn_in_trait)]
pub trait CompletionService {
    /// Runs the structured audit prompt and parses the model's JSON reply.
    async fn audit(&self, request: AuditRequest<'_>) -> Result<AuditOutcome, ProviderError>;

    /// Sends an assistant conversation and returns the raw reply text.
    async fn chat(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
    ) -> Result<String, ProviderError>;
}

/// Runtime-selected backend. The request names a provider; the server
/// holds one configured client per backend and dispatches through this.
pub enum ProviderClient {
    Gemini(GeminiClient),
    Openai(OpenAiClient),
}

impl ProviderClient {
    #[must_use]
    pub fn provider(&self) -> ModelProvider {
        match self {
            ProviderClient::Gemini(_) => ModelProvider::Gemini,
            ProviderClient::Openai(_) => ModelProvider::Openai,
        }
    }
}

impl CompletionService for ProviderClient {
    async fn audit(&self, request: AuditRequest<'_>) -> Result<AuditOutcome, ProviderError> {
        match self {
            ProviderClient::Gemini(client) => client.audit(request).await,
            ProviderClient::Openai(client) => client.audit(request).await,
        }
    }

    async fn chat(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
    ) -> Result<String, ProviderError> {
        match self {
            ProviderClient::Gemini(client) => client.chat(system_prompt, history).await,
            ProviderClient::Openai(client) => client.chat(system_prompt, history).await,
        }
    }
}
