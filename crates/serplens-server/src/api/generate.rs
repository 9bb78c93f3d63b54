use std::time::Duration;

use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serplens_core::{BrandProfile, GroundingSource, ModelProvider, PageType};
use serplens_engine::{run_audit, AuditError, AuditInput, UploadedDocument};
use serplens_provider::DocumentPayload;
use tracing::info;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

const MAX_DOCUMENT_BYTES: usize = 15 * 1024 * 1024;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Either the source string (URL or pasted content) or a
    /// `{data, mimeType}` document object.
    input: Value,
    profile: BrandProfile,
    #[serde(default)]
    is_url: bool,
    model_provider: ModelProvider,
    #[serde(default)]
    page_type: Option<PageType>,
    /// Original filename of an uploaded document, used as the archive
    /// source label.
    #[serde(default)]
    file_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateData {
    /// The completed generation, serialized as a JSON string.
    data: String,
    grounding_sources: Vec<GroundingSource>,
}

pub async fn generate(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<GenerateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = parse_input(&req_id.0, &request)?;

    let timeout = Duration::from_secs(state.config.audit_timeout_secs);
    let audit = match request.model_provider {
        ModelProvider::Gemini => {
            let client = state.gemini.as_ref().ok_or_else(|| config_error(&req_id.0))?;
            run_audit(
                client.as_ref(),
                &input,
                &request.profile,
                request.page_type,
                ModelProvider::Gemini,
                timeout,
            )
            .await
        }
        ModelProvider::Openai => {
            let client = state.openai.as_ref().ok_or_else(|| config_error(&req_id.0))?;
            run_audit(
                client.as_ref(),
                &input,
                &request.profile,
                request.page_type,
                ModelProvider::Openai,
                timeout,
            )
            .await
        }
    };

    let generation = audit.map_err(|e| map_audit_error(req_id.0.clone(), &e))?;

    info!(
        generation_id = %generation.id,
        provider = %generation.model_provider,
        page_type = %generation.page_type,
        "audit complete"
    );

    let grounding_sources = generation.grounding_sources.clone().unwrap_or_default();
    let serialized = serde_json::to_string(&generation).map_err(|e| {
        tracing::error!(error = %e, "failed to serialize generation");
        ApiError::new(req_id.0.clone(), "internal_error", "failed to serialize result")
    })?;

    {
        let mut archive = state.archive.lock().await;
        if let Err(e) = archive.append(generation) {
            tracing::error!(error = %e, "failed to persist generation to archive");
        }
    }

    Ok(Json(ApiResponse {
        data: GenerateData {
            data: serialized,
            grounding_sources,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn parse_input(request_id: &str, request: &GenerateRequest) -> Result<AuditInput, ApiError> {
    match &request.input {
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(ApiError::new(
                    request_id,
                    "validation_error",
                    "Provide source URL or HTML content to begin audit.",
                ));
            }
            if request.is_url {
                Ok(AuditInput {
                    url: Some(trimmed.to_string()),
                    ..AuditInput::default()
                })
            } else {
                Ok(AuditInput {
                    pasted: Some(text.clone()),
                    ..AuditInput::default()
                })
            }
        }
        value @ Value::Object(_) => {
            let payload: DocumentPayload =
                serde_json::from_value(value.clone()).map_err(|_| {
                    ApiError::new(
                        request_id,
                        "validation_error",
                        "Document input requires data and mimeType fields.",
                    )
                })?;

            if decoded_size(&payload.data) > MAX_DOCUMENT_BYTES {
                return Err(ApiError::new(
                    request_id,
                    "validation_error",
                    "File too large. Please upload a document under 15MB.",
                ));
            }

            Ok(AuditInput {
                document: Some(UploadedDocument {
                    filename: request.file_name.clone(),
                    payload,
                }),
                ..AuditInput::default()
            })
        }
        _ => Err(ApiError::new(
            request_id,
            "validation_error",
            "Provide source URL or HTML content to begin audit.",
        )),
    }
}

/// Decoded size of a base64 payload, from its encoded length.
///
/// Saturates at zero for malformed input (length not a multiple of four,
/// or more padding than data); the provider rejects such payloads later.
fn decoded_size(encoded: &str) -> usize {
    let padding = encoded.bytes().rev().take_while(|&b| b == b'=').count();
    ((encoded.len() / 4) * 3).saturating_sub(padding)
}

fn config_error(request_id: &str) -> ApiError {
    ApiError::new(
        request_id,
        "provider_config",
        "Provider credentials are not configured.",
    )
}

fn map_audit_error(request_id: String, error: &AuditError) -> ApiError {
    let code = match error {
        AuditError::InvalidInput(_) => "validation_error",
        AuditError::Timeout => "timeout",
        AuditError::RateLimited => "rate_limited",
        AuditError::AuditFailed => "audit_failed",
        AuditError::ProviderConfig => "provider_config",
    };
    ApiError::new(request_id, code, error.to_string())
}
