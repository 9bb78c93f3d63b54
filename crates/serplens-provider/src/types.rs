use serde::Deserialize;
use serplens_core::{AuditResult, GroundingSource};

/// A base64-encoded uploaded document forwarded to the model inline.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPayload {
    pub data: String,
    pub mime_type: String,
}

/// One audit invocation: composed prompts plus the optional document.
///
/// `use_grounding` requests web-search grounding where the backend
/// supports it (Gemini URL audits); backends without grounding ignore it.
#[derive(Debug, Clone, Copy)]
pub struct AuditRequest<'a> {
    pub system_prompt: &'a str,
    pub user_message: &'a str,
    pub document: Option<&'a DocumentPayload>,
    pub use_grounding: bool,
}

/// Parsed audit reply plus any web citations the backend reported.
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub result: AuditResult,
    pub grounding_sources: Vec<GroundingSource>,
}
