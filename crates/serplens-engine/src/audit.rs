//! The audit orchestrator: one provider call raced against a deadline,
//! then a `Generation` assembled from whatever the model returned.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::distr::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use serplens_core::{BrandProfile, Generation, ModelProvider, PageType};
use serplens_provider::{AuditRequest, CompletionService, DocumentPayload, ProviderError};
use serplens_schema::{audit_system_prompt, audit_user_message, AuditInputKind};
use thiserror::Error;
use tracing::{error, warn};

/// Errors surfaced to the dashboard, with their exact user-facing text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuditError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Connection timed out.")]
    Timeout,

    #[error("Engine is busy. Try again soon.")]
    RateLimited,

    #[error("Audit failed. Check source accessibility.")]
    AuditFailed,

    #[error("Provider credentials are not configured.")]
    ProviderConfig,
}

/// An uploaded document plus the filename it arrived under.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: Option<String>,
    pub payload: DocumentPayload,
}

/// The three mutually exclusive audit sources. Exactly one must be set.
#[derive(Debug, Clone, Default)]
pub struct AuditInput {
    pub url: Option<String>,
    pub pasted: Option<String>,
    pub document: Option<UploadedDocument>,
}

impl AuditInput {
    fn present_sources(&self) -> usize {
        usize::from(self.url.as_deref().is_some_and(|u| !u.trim().is_empty()))
            + usize::from(self.pasted.as_deref().is_some_and(|p| !p.trim().is_empty()))
            + usize::from(self.document.is_some())
    }

    /// Source label stored on the generation: URL, then filename, then a
    /// manual-input marker distinguishing pasted content from the rest.
    fn source_label(&self) -> String {
        if let Some(url) = self.url.as_deref().filter(|u| !u.trim().is_empty()) {
            return url.trim().to_string();
        }
        if let Some(name) = self
            .document
            .as_ref()
            .and_then(|doc| doc.filename.as_deref())
        {
            return name.to_string();
        }
        if self.pasted.is_some() {
            return "Manual Context".to_string();
        }
        "Manual Audit".to_string()
    }
}

/// Runs one audit end to end: validates the input, composes the prompts,
/// races the provider call against `timeout`, and assembles the
/// `Generation`. The late loser of the race is dropped, not awaited.
///
/// # Errors
///
/// - [`AuditError::InvalidInput`] unless exactly one source is present.
/// - [`AuditError::Timeout`] when the deadline elapses first.
/// - [`AuditError::RateLimited`] when the provider returned 429.
/// - [`AuditError::ProviderConfig`] when credentials are missing.
/// - [`AuditError::AuditFailed`] for every other provider failure, and
///   for structurally valid replies with zero variants.
pub async fn run_audit<S: CompletionService>(
    service: &S,
    input: &AuditInput,
    profile: &BrandProfile,
    page_type_override: Option<PageType>,
    provider: ModelProvider,
    timeout: Duration,
) -> Result<Generation, AuditError> {
    match input.present_sources() {
        0 => {
            return Err(AuditError::InvalidInput(
                "Provide source URL or HTML content to begin audit.".to_string(),
            ))
        }
        1 => {}
        _ => {
            return Err(AuditError::InvalidInput(
                "Provide exactly one audit source.".to_string(),
            ))
        }
    }

    let system_prompt = audit_system_prompt(profile);
    let trimmed_url = input.url.as_deref().map(str::trim).filter(|u| !u.is_empty());
    let kind = if let Some(url) = trimmed_url {
        AuditInputKind::Url(url)
    } else if input.document.is_some() {
        AuditInputKind::Document
    } else {
        AuditInputKind::Pasted(input.pasted.as_deref().unwrap_or_default())
    };
    let user_message = audit_user_message(kind);

    let request = AuditRequest {
        system_prompt: &system_prompt,
        user_message: &user_message,
        document: input.document.as_ref().map(|doc| &doc.payload),
        use_grounding: trimmed_url.is_some(),
    };

    let outcome = match tokio::time::timeout(timeout, service.audit(request)).await {
        Err(_) => return Err(AuditError::Timeout),
        Ok(Err(e)) => return Err(map_provider_error(&e, provider)),
        Ok(Ok(outcome)) => outcome,
    };

    if outcome.result.seo_variants.is_empty() {
        return Err(AuditError::AuditFailed);
    }

    let mut result = outcome.result;
    result.schema_jsonld = normalize_schema(result.schema_jsonld);

    let page_type = page_type_override
        .or(result.page_type)
        .unwrap_or(PageType::Generic);

    let grounding_sources = if outcome.grounding_sources.is_empty() {
        None
    } else {
        Some(outcome.grounding_sources)
    };

    Ok(Generation {
        id: generation_id(),
        timestamp: now_millis(),
        url: input.source_label(),
        profile_id: profile.id.clone(),
        page_type,
        model_provider: provider,
        extracted: result.extraction,
        seo_variants: result.seo_variants,
        ai_recommendation: result.ai_recommendation,
        strategic_impact: result.strategic_impact,
        schema_jsonld: result.schema_jsonld,
        schema_commentary: result.schema_commentary,
        validation: result.validation,
        grounding_sources,
    })
}

fn map_provider_error(error: &ProviderError, provider: ModelProvider) -> AuditError {
    match error {
        ProviderError::RateLimited => AuditError::RateLimited,
        ProviderError::MissingCredential(_) => AuditError::ProviderConfig,
        other => {
            error!(%provider, error = %other, "audit provider call failed");
            AuditError::AuditFailed
        }
    }
}

/// Sloppier replies return the graph as a JSON string; unwrap it. Strings
/// that do not parse are kept as-is.
fn normalize_schema(schema: Value) -> Value {
    match schema {
        Value::String(encoded) => match serde_json::from_str::<Value>(&encoded) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "schemaJsonld string did not parse; keeping as-is");
                Value::String(encoded)
            }
        },
        other => other,
    }
}

/// Random 9-character alphanumeric token, matching the dashboard's ids.
fn generation_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect()
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
    use serplens_core::{AuditResult, ChatMessage};
    use serplens_provider::AuditOutcome;

    /// Stub provider: replies with a canned outcome, never resolves (for
    /// the deadline race), or panics when invoked (for asserting that
    /// validation short-circuits before any provider call).
    enum StubService {
        Reply(Box<dyn Fn() -> Result<AuditOutcome, ProviderError> + Send + Sync>),
        Hang,
        Unreachable,
    }

    impl CompletionService for StubService {
        async fn audit(
            &self,
            _request: AuditRequest<'_>,
        ) -> Result<AuditOutcome, ProviderError> {
            match self {
                StubService::Reply(f) => f(),
                StubService::Hang => std::future::pending().await,
                StubService::Unreachable => panic!("provider must not be called"),
            }
        }

        async fn chat(
            &self,
            _system_prompt: &str,
            _history: &[ChatMessage],
        ) -> Result<String, ProviderError> {
            unimplemented!("not used in audit tests")
        }
    }

    fn profile() -> BrandProfile {
        BrandProfile {
            id: "ei".to_string(),
            name: "Emirates Islamic".to_string(),
            legal_name: "Emirates Islamic Bank PJSC".to_string(),
            org_type: "BankOrCreditUnion".to_string(),
            domain: "www.emiratesislamic.ae".to_string(),
            logo_url: "https://www.emiratesislamic.ae/logo.svg".to_string(),
            address: vec![],
            contact_points: vec![],
            same_as: vec![],
            primary_color: "#461e57".to_string(),
            accent_color: "#8a2be2".to_string(),
            surface_color: "#f7f2fb".to_string(),
        }
    }

    fn outcome_with(result: AuditResult) -> StubService {
        let json = serde_json::to_value(&result).unwrap();
        StubService::Reply(Box::new(move || {
            Ok(AuditOutcome {
                result: serde_json::from_value(json.clone()).unwrap(),
                grounding_sources: vec![],
            })
        }))
    }

    fn good_result() -> AuditResult {
        serde_json::from_value(serde_json::json!({
            "pageType": "product",
            "seoVariants": [
                {"h1": "A", "metaTitle": "A", "metaDescription": "A"},
                {"h1": "B", "metaTitle": "B", "metaDescription": "B"},
                {"h1": "C", "metaTitle": "C", "metaDescription": "C"}
            ],
            "schemaJsonld": {"@context": "https://schema.org", "@graph": []}
        }))
        .unwrap()
    }

    fn url_input(url: &str) -> AuditInput {
        AuditInput {
            url: Some(url.to_string()),
            ..AuditInput::default()
        }
    }

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn rejects_empty_input_before_provider_call() {
        let err = run_audit(
            &StubService::Unreachable,
            &AuditInput::default(),
            &profile(),
            None,
            ModelProvider::Gemini,
            TIMEOUT,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuditError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn rejects_multiple_sources_before_provider_call() {
        let input = AuditInput {
            url: Some("https://x.example".to_string()),
            pasted: Some("<html></html>".to_string()),
            document: None,
        };
        let err = run_audit(
            &StubService::Unreachable,
            &input,
            &profile(),
            None,
            ModelProvider::Gemini,
            TIMEOUT,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuditError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn blank_url_does_not_count_as_source() {
        let service = outcome_with(good_result());
        let input = AuditInput {
            url: Some("   ".to_string()),
            pasted: Some("<h1>Card</h1>".to_string()),
            document: None,
        };
        let generation = run_audit(
            &service,
            &input,
            &profile(),
            None,
            ModelProvider::Gemini,
            TIMEOUT,
        )
        .await
        .expect("blank url plus pasted content is one source");
        assert_eq!(generation.url, "Manual Context");
    }

    #[tokio::test]
    async fn builds_generation_from_url_audit() {
        let service = outcome_with(good_result());
        let generation = run_audit(
            &service,
            &url_input("https://www.emiratesislamic.ae/en/cards"),
            &profile(),
            None,
            ModelProvider::Gemini,
            TIMEOUT,
        )
        .await
        .expect("audit should succeed");

        assert_eq!(generation.id.len(), 9);
        assert!(generation.id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(generation.url, "https://www.emiratesislamic.ae/en/cards");
        assert_eq!(generation.profile_id, "ei");
        assert_eq!(generation.page_type, PageType::Product);
        assert_eq!(generation.model_provider, ModelProvider::Gemini);
        assert_eq!(generation.seo_variants.len(), 3);
        assert!(generation.timestamp > 1_600_000_000_000);
    }

    #[tokio::test]
    async fn page_type_override_beats_provider_report() {
        let service = outcome_with(good_result());
        let generation = run_audit(
            &service,
            &url_input("https://x.example"),
            &profile(),
            Some(PageType::Campaign),
            ModelProvider::Openai,
            TIMEOUT,
        )
        .await
        .unwrap();
        assert_eq!(generation.page_type, PageType::Campaign);
    }

    #[tokio::test]
    async fn missing_page_type_defaults_to_generic() {
        let mut result = good_result();
        result.page_type = None;
        let service = outcome_with(result);
        let generation = run_audit(
            &service,
            &url_input("https://x.example"),
            &profile(),
            None,
            ModelProvider::Gemini,
            TIMEOUT,
        )
        .await
        .unwrap();
        assert_eq!(generation.page_type, PageType::Generic);
    }

    #[tokio::test]
    async fn zero_variants_is_audit_failure() {
        let mut result = good_result();
        result.seo_variants.clear();
        let service = outcome_with(result);
        let err = run_audit(
            &service,
            &url_input("https://x.example"),
            &profile(),
            None,
            ModelProvider::Gemini,
            TIMEOUT,
        )
        .await
        .unwrap_err();
        assert_eq!(err, AuditError::AuditFailed);
    }

    #[tokio::test]
    async fn string_schema_is_normalized_to_object() {
        let mut result = good_result();
        result.schema_jsonld =
            Value::String("{\"@context\": \"https://schema.org\", \"@graph\": []}".to_string());
        let service = outcome_with(result);
        let generation = run_audit(
            &service,
            &url_input("https://x.example"),
            &profile(),
            None,
            ModelProvider::Gemini,
            TIMEOUT,
        )
        .await
        .unwrap();
        assert_eq!(generation.schema_jsonld["@context"], "https://schema.org");
    }

    #[tokio::test]
    async fn unparsable_string_schema_is_kept_verbatim() {
        let mut result = good_result();
        result.schema_jsonld = Value::String("not a graph".to_string());
        let service = outcome_with(result);
        let generation = run_audit(
            &service,
            &url_input("https://x.example"),
            &profile(),
            None,
            ModelProvider::Gemini,
            TIMEOUT,
        )
        .await
        .unwrap();
        assert_eq!(generation.schema_jsonld, Value::String("not a graph".to_string()));
    }

    #[tokio::test]
    async fn document_label_falls_back_through_chain() {
        let service = outcome_with(good_result());
        let input = AuditInput {
            url: None,
            pasted: None,
            document: Some(UploadedDocument {
                filename: Some("brief.pdf".to_string()),
                payload: DocumentPayload {
                    data: "aGVsbG8=".to_string(),
                    mime_type: "application/pdf".to_string(),
                },
            }),
        };
        let generation = run_audit(
            &service,
            &input,
            &profile(),
            None,
            ModelProvider::Gemini,
            TIMEOUT,
        )
        .await
        .unwrap();
        assert_eq!(generation.url, "brief.pdf");
    }

    #[tokio::test]
    async fn deadline_elapsing_maps_to_timeout() {
        let err = run_audit(
            &StubService::Hang,
            &url_input("https://x.example"),
            &profile(),
            None,
            ModelProvider::Gemini,
            Duration::from_millis(20),
        )
        .await
        .unwrap_err();
        assert_eq!(err, AuditError::Timeout);
        assert_eq!(err.to_string(), "Connection timed out.");
    }

    #[tokio::test]
    async fn provider_429_maps_to_rate_limited() {
        let service = StubService::Reply(Box::new(|| Err(ProviderError::RateLimited)));
        let err = run_audit(
            &service,
            &url_input("https://x.example"),
            &profile(),
            None,
            ModelProvider::Openai,
            TIMEOUT,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Engine is busy. Try again soon.");
    }

    #[tokio::test]
    async fn missing_credential_maps_to_provider_config() {
        let service = StubService::Reply(Box::new(|| {
            Err(ProviderError::MissingCredential("SERPLENS_OPENAI_API_KEY"))
        }));
        let err = run_audit(
            &service,
            &url_input("https://x.example"),
            &profile(),
            None,
            ModelProvider::Openai,
            TIMEOUT,
        )
        .await
        .unwrap_err();
        assert_eq!(err, AuditError::ProviderConfig);
    }

    #[tokio::test]
    async fn other_provider_errors_map_to_audit_failed() {
        let service = StubService::Reply(Box::new(|| Err(ProviderError::Empty)));
        let err = run_audit(
            &service,
            &url_input("https://x.example"),
            &profile(),
            None,
            ModelProvider::Gemini,
            TIMEOUT,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Audit failed. Check source accessibility.");
    }
}
