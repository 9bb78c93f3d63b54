use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serplens_core::{ChatMessage, Generation, SeoVariant};
use serplens_engine::{send_turn, AssistantError};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    messages: Vec<ChatMessage>,
    #[serde(default)]
    context: Option<Generation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatData {
    message: String,
    new_variant: Option<SeoVariant>,
    new_schema: Option<Value>,
}

/// Assistant turns always run on the OpenAI chat model.
pub async fn chat(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(client) = state.openai.as_ref() else {
        return Err(ApiError::new(
            req_id.0,
            "provider_config",
            "Provider credentials are not configured.",
        ));
    };

    let reply = send_turn(client.as_ref(), &request.messages, request.context.as_ref())
        .await
        .map_err(|e| map_assistant_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: ChatData {
            message: reply.content,
            new_variant: reply.new_variant,
            new_schema: reply.new_schema,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn map_assistant_error(request_id: String, error: &AssistantError) -> ApiError {
    let code = match error {
        AssistantError::InvalidInput(_) => "validation_error",
        AssistantError::RateLimited => "rate_limited",
        AssistantError::ProviderConfig => "provider_config",
        AssistantError::Failed => "chat_failed",
    };
    ApiError::new(request_id, code, error.to_string())
}
