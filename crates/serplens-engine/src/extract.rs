//! Structured-payload extraction from assistant replies.
//!
//! The assistant is instructed to wrap contributed variants and schemas in
//! marker lines. Models drift, so two fallbacks cover the common failure
//! shapes: fenced code blocks and bare JSON objects. Parse failures are
//! logged and swallowed; the conversational text always survives.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use serplens_core::SeoVariant;
use tracing::{debug, warn};

static VARIANT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)---NEW_VARIANT---(.*?)---END_VARIANT---")
        .expect("variant marker regex is valid")
});

static SCHEMA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)---NEW_SCHEMA---(.*?)---END_SCHEMA---")
        .expect("schema marker regex is valid")
});

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("code fence regex is valid")
});

static BARE_SCHEMA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)\{.*"@context".*"@graph".*\}"#).expect("bare schema regex is valid")
});

/// An assistant reply split into conversational text and any structured
/// payloads recovered from it.
#[derive(Debug, Clone, Default)]
pub struct ExtractedReply {
    /// Reply text with marker blocks removed.
    pub cleaned_text: String,
    pub variant: Option<SeoVariant>,
    pub schema: Option<Value>,
}

/// Extracts structured payloads from a raw assistant reply.
///
/// Marker-delimited blocks are authoritative. When no marker parsed, a
/// fenced JSON block is classified by shape (`@context`/`@graph` →
/// schema, `metaTitle` + `metaDescription` → variant), and finally a bare
/// object containing both schema keys is tried. Marker blocks are always
/// stripped from the cleaned text, even when their contents fail to parse.
#[must_use]
pub fn extract_reply(raw: &str) -> ExtractedReply {
    let mut variant: Option<SeoVariant> = None;
    let mut schema: Option<Value> = None;

    if let Some(captures) = VARIANT_RE.captures(raw) {
        match serde_json::from_str::<SeoVariant>(captures[1].trim()) {
            Ok(parsed) => variant = Some(parsed),
            Err(e) => warn!(error = %e, "failed to parse marker-delimited variant"),
        }
    }

    if let Some(captures) = SCHEMA_RE.captures(raw) {
        match serde_json::from_str::<Value>(captures[1].trim()) {
            Ok(parsed) => schema = Some(parsed),
            Err(e) => warn!(error = %e, "failed to parse marker-delimited schema"),
        }
    }

    if variant.is_none() && schema.is_none() {
        if let Some(captures) = FENCE_RE.captures(raw) {
            match serde_json::from_str::<Value>(captures[1].trim()) {
                Ok(parsed) => classify_fenced(parsed, &mut variant, &mut schema),
                Err(e) => warn!(error = %e, "failed to parse fenced JSON block"),
            }
        }
    }

    if variant.is_none() && schema.is_none() {
        if let Some(matched) = BARE_SCHEMA_RE.find(raw) {
            match serde_json::from_str::<Value>(matched.as_str()) {
                Ok(parsed) => {
                    debug!("extracted schema from bare JSON object");
                    schema = Some(parsed);
                }
                Err(e) => warn!(error = %e, "failed to parse bare JSON schema"),
            }
        }
    }

    let cleaned = SCHEMA_RE.replace_all(raw, "");
    let cleaned = VARIANT_RE.replace_all(&cleaned, "");

    ExtractedReply {
        cleaned_text: cleaned.trim().to_string(),
        variant,
        schema,
    }
}

fn classify_fenced(parsed: Value, variant: &mut Option<SeoVariant>, schema: &mut Option<Value>) {
    let is_schema = parsed.get("@context").is_some() || parsed.get("@graph").is_some();
    if is_schema {
        debug!("extracted schema from fenced code block");
        *schema = Some(parsed);
        return;
    }

    if parsed.get("metaTitle").is_some() && parsed.get("metaDescription").is_some() {
        match serde_json::from_value::<SeoVariant>(parsed) {
            Ok(parsed_variant) => {
                debug!("extracted variant from fenced code block");
                *variant = Some(parsed_variant);
            }
            Err(e) => warn!(error = %e, "fenced block looked like a variant but did not parse"),
        }
    }
}
