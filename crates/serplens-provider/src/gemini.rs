//! Client for the Gemini `generateContent` REST API.
//!
//! URL audits run on the grounded model with the web-search tool enabled;
//! everything else uses the default model. Replies are requested as JSON
//! and parsed into the shared audit result type.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use serplens_core::{AuditResult, ChatMessage, ChatRole, GroundingSource};
use tracing::debug;

use crate::error::ProviderError;
use crate::types::{AuditOutcome, AuditRequest};
use crate::CompletionService;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Client for the Gemini API.
///
/// Use [`GeminiClient::new`] for production or
/// [`GeminiClient::with_base_url`] to point at a mock server in tests.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    grounded_model: String,
}

impl GeminiClient {
    /// Creates a new client pointed at the production Gemini API.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        model: &str,
        grounded_model: &str,
    ) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, timeout_secs, model, grounded_model, DEFAULT_BASE_URL)
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
        grounded_model: &str,
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
            grounded_model: grounded_model.to_owned(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    async fn generate(&self, model: &str, body: &Value) -> Result<GenerateReply, ProviderError> {
        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
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
        serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
            context: format!("generateContent({model})"),
            source: e,
        })
    }
}

impl CompletionService for GeminiClient {
    async fn audit(&self, request: AuditRequest<'_>) -> Result<AuditOutcome, ProviderError> {
        let model = if request.use_grounding {
            &self.grounded_model
        } else {
            &self.model
        };
        debug!(model, grounded = request.use_grounding, "gemini audit request");

        let mut parts: Vec<Value> = Vec::new();
        if let Some(doc) = request.document {
            parts.push(json!({
                "inlineData": { "data": doc.data, "mimeType": doc.mime_type }
            }));
        }
        parts.push(json!({ "text": request.user_message }));

        let mut body = json!({
            "systemInstruction": { "parts": [{ "text": request.system_prompt }] },
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": {
                "temperature": 0.1,
                "responseMimeType": "application/json"
            }
        });
        if request.use_grounding {
            body["tools"] = json!([{ "googleSearch": {} }]);
        }

        let reply = self.generate(model, &body).await?;
        let text = reply.text();
        if text.trim().is_empty() {
            return Err(ProviderError::Empty);
        }

        let result: AuditResult =
            serde_json::from_str(&text).map_err(|e| ProviderError::Deserialize {
                context: "gemini audit reply".to_string(),
                source: e,
            })?;

        Ok(AuditOutcome {
            result,
            grounding_sources: reply.grounding_sources(),
        })
    }

    async fn chat(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
    ) -> Result<String, ProviderError> {
        let contents: Vec<Value> = history
            .iter()
            .map(|message| {
                json!({
                    "role": match message.role {
                        ChatRole::User => "user",
                        ChatRole::Assistant => "model",
                    },
                    "parts": [{ "text": message.content }]
                })
            })
            .collect();

        let body = json!({
            "systemInstruction": { "parts": [{ "text": system_prompt }] },
            "contents": contents,
            "generationConfig": { "temperature": 0.7, "maxOutputTokens": 1500 }
        });

        let reply = self.generate(&self.model, &body).await?;
        let text = reply.text();
        if text.trim().is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(text)
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
struct GenerateReply {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    #[serde(default)]
    title: Option<String>,
    uri: String,
}

impl GenerateReply {
    /// Concatenated text of the first candidate's parts.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }

    /// Web citations from the first candidate's grounding metadata.
    fn grounding_sources(&self) -> Vec<GroundingSource> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|metadata| {
                metadata
                    .grounding_chunks
                    .iter()
                    .filter_map(|chunk| chunk.web.as_ref())
                    .map(|web| GroundingSource {
                        title: web
                            .title
                            .clone()
                            .unwrap_or_else(|| "Source Reference".to_string()),
                        uri: web.uri.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> GeminiClient {
        GeminiClient::with_base_url(
            "test-key",
            30,
            "gemini-2.5-flash",
            "gemini-1.5-pro",
            base_url,
        )
        .expect("client construction should not fail")
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let client = test_client("http://localhost:9999/");
        assert_eq!(
            client.endpoint("gemini-2.5-flash"),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn reply_text_concatenates_parts() {
        let reply: GenerateReply = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] }
            }]
        }))
        .unwrap();
        assert_eq!(reply.text(), "{\"a\":1}");
    }

    #[test]
    fn reply_grounding_sources_default_title() {
        let reply: GenerateReply = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://a.example" } },
                        { "web": { "title": "Titled", "uri": "https://b.example" } },
                        {}
                    ]
                }
            }]
        }))
        .unwrap();
        let sources = reply.grounding_sources();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].title, "Source Reference");
        assert_eq!(sources[1].title, "Titled");
    }

    #[test]
    fn api_message_prefers_error_field() {
        let msg = extract_api_message(r#"{"error": {"message": "quota exceeded"}}"#);
        assert_eq!(msg, "quota exceeded");
        assert_eq!(extract_api_message("plain failure"), "plain failure");
    }
}
