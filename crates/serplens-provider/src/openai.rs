//! Client for the OpenAI chat-completions API.
//!
//! Audits run on the audit model with JSON response format; assistant
//! turns run on the cheaper chat model. OpenAI has no web-search
//! grounding here, so audit outcomes always carry an empty citation list.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use serplens_core::{AuditResult, ChatMessage, ChatRole};
use tracing::debug;

use crate::error::ProviderError;
use crate::types::{AuditOutcome, AuditRequest};
use crate::CompletionService;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Client for the OpenAI API.
///
/// Use [`OpenAiClient::new`] for production or
/// [`OpenAiClient::with_base_url`] to point at a mock server in tests.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    chat_model: String,
}

impl OpenAiClient {
    /// Creates a new client pointed at the production OpenAI API.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        model: &str,
        chat_model: &str,
    ) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, timeout_secs, model, chat_model, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        model: &str,
        chat_model: &str,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("serplens/0.1 (seo-audit)")
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            model: model.to_owned(),
            chat_model: chat_model.to_owned(),
        })
    }

    async fn complete(&self, body: &Value) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: extract_api_message(&body),
            });
        }

        let body = response.text().await?;
        let reply: CompletionReply =
            serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
                context: "chat/completions".to_string(),
                source: e,
            })?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(content)
    }
}

impl CompletionService for OpenAiClient {
    async fn audit(&self, request: AuditRequest<'_>) -> Result<AuditOutcome, ProviderError> {
        debug!(model = %self.model, "openai audit request");

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.user_message }
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.1
        });

        let content = self.complete(&body).await?;
        let result: AuditResult =
            serde_json::from_str(&content).map_err(|e| ProviderError::Deserialize {
                context: "openai audit reply".to_string(),
                source: e,
            })?;

        Ok(AuditOutcome {
            result,
            grounding_sources: Vec::new(),
        })
    }

    async fn chat(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
    ) -> Result<String, ProviderError> {
        let mut messages = vec![json!({ "role": "system", "content": system_prompt })];
        messages.extend(history.iter().map(|message| {
            json!({
                "role": match message.role {
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                },
                "content": message.content
            })
        }));

        let body = json!({
            "model": self.chat_model,
            "messages": messages,
            "temperature": 0.7,
            "max_tokens": 1500
        });

        self.complete(&body).await
    }
}

fn extract_api_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[derive(Debug, Deserialize)]
struct CompletionReply {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
