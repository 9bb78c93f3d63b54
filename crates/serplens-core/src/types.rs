//! Canonical data model for audit results, generations, and chat turns.
//!
//! Everything here crosses the JSON wire, so field names serialize in
//! camelCase to match the dashboard's payloads.

use serde::{Deserialize, Serialize};

/// Coarse content category driving which schema nodes are mandatory.
///
/// The classifier works with a richer internal label set (`ProductPage`,
/// `CampaignPage`, ...); this enum is the wire-level category stored on a
/// [`Generation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Product,
    Campaign,
    Offer,
    PressRelease,
    Generic,
}

impl PageType {
    pub const ALL: [PageType; 5] = [
        PageType::Product,
        PageType::Campaign,
        PageType::Offer,
        PageType::PressRelease,
        PageType::Generic,
    ];
}

impl std::fmt::Display for PageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageType::Product => write!(f, "product"),
            PageType::Campaign => write!(f, "campaign"),
            PageType::Offer => write!(f, "offer"),
            PageType::PressRelease => write!(f, "press_release"),
            PageType::Generic => write!(f, "generic"),
        }
    }
}

/// Which model-completion backend serviced a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    Gemini,
    Openai,
}

impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelProvider::Gemini => write!(f, "gemini"),
            ModelProvider::Openai => write!(f, "openai"),
        }
    }
}

/// One candidate SEO metadata package for a given source content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoVariant {
    pub h1: String,
    pub meta_title: String,
    pub meta_description: String,
    #[serde(default)]
    pub keyphrases: Vec<String>,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub best_for: String,
    #[serde(default)]
    pub justification: String,
    #[serde(default)]
    pub situational_comparison: String,
    /// Set when the variant was contributed through the chat assistant.
    #[serde(default)]
    pub is_enhanced: bool,
}

/// The model's pick among the returned variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiRecommendation {
    pub winner_index: usize,
    pub expert_rationale: String,
    #[serde(default)]
    pub comparison_notes: String,
}

/// 0-100 strategic scores reported alongside the audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategicImpact {
    pub visibility_score: f64,
    pub trust_score: f64,
    pub compliance_score: f64,
    #[serde(default)]
    pub growth_rationale: String,
    #[serde(default)]
    pub entity_linkage: Vec<String>,
}

/// Errors/warnings/suggestions surfaced by the model's self-validation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationSummary {
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// A citation returned by a provider that used web-search grounding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// Snapshot of what the model extracted from the source page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    #[serde(default)]
    pub title_current: String,
    #[serde(default)]
    pub meta_current: String,
    #[serde(default)]
    pub h1_current: String,
    #[serde(default)]
    pub headings: Vec<String>,
    #[serde(default)]
    pub main_text_preview: String,
}

/// The structured audit payload a provider adapter parses out of the
/// model's JSON reply. The orchestrator turns this into a [`Generation`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    #[serde(default)]
    pub page_type: Option<PageType>,
    #[serde(default)]
    pub extraction: Extraction,
    #[serde(default)]
    pub seo_variants: Vec<SeoVariant>,
    #[serde(default)]
    pub ai_recommendation: Option<AiRecommendation>,
    #[serde(default)]
    pub strategic_impact: Option<StrategicImpact>,
    /// Either a JSON-LD object or (from sloppier replies) a JSON string
    /// that itself encodes the object. Normalized before storage.
    #[serde(default)]
    pub schema_jsonld: serde_json::Value,
    #[serde(default)]
    pub schema_commentary: Option<String>,
    #[serde(default)]
    pub validation: ValidationSummary,
}

/// The unit of persisted work: one completed audit.
///
/// `seo_variants` is non-empty by construction: the orchestrator rejects
/// provider output with zero variants before a `Generation` exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    pub id: String,
    /// Epoch milliseconds, matching the dashboard's timestamp format.
    pub timestamp: i64,
    /// Source label: URL, uploaded filename, or a manual-input marker.
    pub url: String,
    pub profile_id: String,
    pub page_type: PageType,
    pub model_provider: ModelProvider,
    pub extracted: Extraction,
    pub seo_variants: Vec<SeoVariant>,
    #[serde(default)]
    pub ai_recommendation: Option<AiRecommendation>,
    #[serde(default)]
    pub strategic_impact: Option<StrategicImpact>,
    pub schema_jsonld: serde_json::Value,
    #[serde(default)]
    pub schema_commentary: Option<String>,
    #[serde(default)]
    pub validation: ValidationSummary,
    #[serde(default)]
    pub grounding_sources: Option<Vec<GroundingSource>>,
}

impl Generation {
    /// Appends an assistant-contributed variant. Variants are never edited
    /// in place; anything added after initial creation carries the
    /// enhanced flag regardless of what the assistant reported.
    pub fn append_enhanced_variant(&mut self, mut variant: SeoVariant) {
        variant.is_enhanced = true;
        self.seo_variants.push(variant);
    }

    /// Replaces the structured-data graph with an assistant-provided one
    /// and notes the swap in the commentary.
    pub fn replace_schema(&mut self, schema: serde_json::Value) {
        self.schema_jsonld = schema;
        let note = "Schema enhanced via assistant.";
        self.schema_commentary = Some(match self.schema_commentary.take() {
            Some(existing) if !existing.is_empty() => format!("{existing}\n{note}"),
            _ => note.to_string(),
        });
    }
}

/// Speaker role in an assistant session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn in an assistant session. Assistant turns may carry a payload
/// the extractor recovered from the reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_variant: Option<SeoVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_schema: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(h1: &str) -> SeoVariant {
        SeoVariant {
            h1: h1.to_string(),
            meta_title: "title".to_string(),
            meta_description: "description".to_string(),
            keyphrases: vec!["kw".to_string()],
            rationale: String::new(),
            best_for: String::new(),
            justification: String::new(),
            situational_comparison: String::new(),
            is_enhanced: false,
        }
    }

    fn generation() -> Generation {
        Generation {
            id: "abc123def".to_string(),
            timestamp: 1_700_000_000_000,
            url: "https://www.emiratesnbd.com/en/cards".to_string(),
            profile_id: "enbd".to_string(),
            page_type: PageType::Product,
            model_provider: ModelProvider::Gemini,
            extracted: Extraction::default(),
            seo_variants: vec![variant("Original")],
            ai_recommendation: None,
            strategic_impact: None,
            schema_jsonld: serde_json::json!({"@context": "https://schema.org", "@graph": []}),
            schema_commentary: None,
            validation: ValidationSummary::default(),
            grounding_sources: None,
        }
    }

    #[test]
    fn page_type_wire_values() {
        assert_eq!(
            serde_json::to_string(&PageType::PressRelease).unwrap(),
            "\"press_release\""
        );
        assert_eq!(
            serde_json::from_str::<PageType>("\"product\"").unwrap(),
            PageType::Product
        );
    }

    #[test]
    fn seo_variant_serializes_camel_case() {
        let json = serde_json::to_value(variant("H1")).unwrap();
        assert!(json.get("metaTitle").is_some());
        assert!(json.get("metaDescription").is_some());
        assert_eq!(json["isEnhanced"], serde_json::json!(false));
    }

    #[test]
    fn append_enhanced_variant_forces_flag() {
        let mut gen = generation();
        gen.append_enhanced_variant(variant("Improved"));
        assert_eq!(gen.seo_variants.len(), 2);
        assert!(gen.seo_variants[1].is_enhanced);
        assert!(!gen.seo_variants[0].is_enhanced);
    }

    #[test]
    fn replace_schema_appends_commentary_note() {
        let mut gen = generation();
        gen.schema_commentary = Some("Initial notes.".to_string());
        gen.replace_schema(serde_json::json!({"@graph": [{"@type": "FAQPage"}]}));
        let commentary = gen.schema_commentary.unwrap();
        assert!(commentary.starts_with("Initial notes."));
        assert!(commentary.contains("enhanced via assistant"));
        assert_eq!(gen.schema_jsonld["@graph"][0]["@type"], "FAQPage");
    }

    #[test]
    fn audit_result_tolerates_missing_optional_fields() {
        let parsed: AuditResult = serde_json::from_value(serde_json::json!({
            "seoVariants": [
                {"h1": "a", "metaTitle": "b", "metaDescription": "c"}
            ]
        }))
        .unwrap();
        assert_eq!(parsed.seo_variants.len(), 1);
        assert!(parsed.page_type.is_none());
        assert!(parsed.schema_jsonld.is_null());
    }
}
