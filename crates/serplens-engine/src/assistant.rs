//! One assistant turn: context-aware system prompt, provider call,
//! payload extraction. Merging recovered payloads into a generation is
//! the caller's decision, via the methods on `Generation` itself.

use std::time::{SystemTime, UNIX_EPOCH};

use serplens_core::{ChatMessage, ChatRole, Generation};
use serplens_provider::{CompletionService, ProviderError};
use serplens_schema::chat_system_prompt;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssistantError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Engine is busy. Try again soon.")]
    RateLimited,

    #[error("Provider credentials are not configured.")]
    ProviderConfig,

    #[error("Chat service error")]
    Failed,
}

/// Services one assistant turn.
///
/// `history` must end with the user's latest message; the full history is
/// forwarded so the model keeps conversational state. The reply is run
/// through the extractor and returned as an assistant `ChatMessage`
/// carrying any recovered payloads.
///
/// # Errors
///
/// - [`AssistantError::InvalidInput`] when the history is empty or does
///   not end with a user turn.
/// - [`AssistantError::RateLimited`] when the provider returned 429.
/// - [`AssistantError::ProviderConfig`] when credentials are missing.
/// - [`AssistantError::Failed`] for every other provider failure.
pub async fn send_turn<S: CompletionService>(
    service: &S,
    history: &[ChatMessage],
    context: Option<&Generation>,
) -> Result<ChatMessage, AssistantError> {
    if history.is_empty() {
        return Err(AssistantError::InvalidInput(
            "Invalid request: messages array required".to_string(),
        ));
    }
    if history.last().map(|m| m.role) != Some(ChatRole::User) {
        return Err(AssistantError::InvalidInput(
            "Conversation must end with a user message.".to_string(),
        ));
    }

    let system_prompt = chat_system_prompt(context);
    let raw = service
        .chat(&system_prompt, history)
        .await
        .map_err(map_provider_error)?;

    let extracted = crate::extract::extract_reply(&raw);

    Ok(ChatMessage {
        role: ChatRole::Assistant,
        content: extracted.cleaned_text,
        timestamp: now_millis(),
        new_variant: extracted.variant,
        new_schema: extracted.schema,
    })
}

fn map_provider_error(e: ProviderError) -> AssistantError {
    match e {
        ProviderError::RateLimited => AssistantError::RateLimited,
        ProviderError::MissingCredential(_) => AssistantError::ProviderConfig,
        other => {
            error!(error = %other, "assistant provider call failed");
            AssistantError::Failed
        }
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serplens_provider::{AuditOutcome, AuditRequest};

    struct StubChat {
        reply: Result<String, fn() -> ProviderError>,
        expect_context: bool,
    }

    impl CompletionService for StubChat {
        async fn audit(
            &self,
            _request: AuditRequest<'_>,
        ) -> Result<AuditOutcome, ProviderError> {
            unimplemented!("not used in assistant tests")
        }

        async fn chat(
            &self,
            system_prompt: &str,
            history: &[ChatMessage],
        ) -> Result<String, ProviderError> {
            assert!(!history.is_empty());
            assert_eq!(
                system_prompt.contains("Current SEO Generation Context"),
                self.expect_context
            );
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn user_turn(content: &str) -> ChatMessage {
        ChatMessage {
            role: ChatRole::User,
            content: content.to_string(),
            timestamp: 0,
            new_variant: None,
            new_schema: None,
        }
    }

    fn generation() -> Generation {
        serde_json::from_value(serde_json::json!({
            "id": "abc123def",
            "timestamp": 1_700_000_000_000_i64,
            "url": "https://www.emiratesnbd.com/en/cards",
            "profileId": "enbd",
            "pageType": "product",
            "modelProvider": "openai",
            "extracted": {},
            "seoVariants": [
                {"h1": "A", "metaTitle": "A", "metaDescription": "A"}
            ],
            "schemaJsonld": {"@context": "https://schema.org", "@graph": []}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn rejects_empty_history() {
        let service = StubChat {
            reply: Ok("hi".to_string()),
            expect_context: false,
        };
        let err = send_turn(&service, &[], None).await.unwrap_err();
        assert!(matches!(err, AssistantError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn rejects_history_ending_with_assistant_turn() {
        let service = StubChat {
            reply: Ok("hi".to_string()),
            expect_context: false,
        };
        let mut assistant_turn = user_turn("done");
        assistant_turn.role = ChatRole::Assistant;
        let err = send_turn(&service, &[assistant_turn], None)
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn plain_reply_becomes_assistant_message() {
        let service = StubChat {
            reply: Ok("Here is some advice.".to_string()),
            expect_context: false,
        };
        let message = send_turn(&service, &[user_turn("help")], None)
            .await
            .expect("turn should succeed");
        assert_eq!(message.role, ChatRole::Assistant);
        assert_eq!(message.content, "Here is some advice.");
        assert!(message.new_variant.is_none());
        assert!(message.new_schema.is_none());
        assert!(message.timestamp > 1_600_000_000_000);
    }

    #[tokio::test]
    async fn context_is_serialized_into_system_prompt() {
        let service = StubChat {
            reply: Ok("ok".to_string()),
            expect_context: true,
        };
        let generation = generation();
        send_turn(&service, &[user_turn("help")], Some(&generation))
            .await
            .expect("turn should succeed");
    }

    #[tokio::test]
    async fn marker_payload_is_attached_and_stripped() {
        let raw = "Done.\n---NEW_SCHEMA---\n{\"@context\": \"https://schema.org\", \"@graph\": []}\n---END_SCHEMA---";
        let service = StubChat {
            reply: Ok(raw.to_string()),
            expect_context: false,
        };
        let message = send_turn(&service, &[user_turn("enhance schema")], None)
            .await
            .unwrap();
        assert_eq!(message.content, "Done.");
        assert!(message.new_schema.is_some());
    }

    #[tokio::test]
    async fn rate_limit_maps_through() {
        let service = StubChat {
            reply: Err(|| ProviderError::RateLimited),
            expect_context: false,
        };
        let err = send_turn(&service, &[user_turn("hi")], None)
            .await
            .unwrap_err();
        assert_eq!(err, AssistantError::RateLimited);
    }

    #[tokio::test]
    async fn other_failures_map_to_chat_service_error() {
        let service = StubChat {
            reply: Err(|| ProviderError::Empty),
            expect_context: false,
        };
        let err = send_turn(&service, &[user_turn("hi")], None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Chat service error");
    }
}
