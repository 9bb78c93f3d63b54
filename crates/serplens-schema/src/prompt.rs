//! Prompt assembly for the audit and assistant paths.
//!
//! Two near-identical banking instruction strings drifted apart in earlier
//! revisions of this product; the fuller server-side version is canonical
//! here and is sent to both providers.

use serplens_core::{BrandProfile, Generation};

/// Pasted content is truncated to this many characters before being
/// embedded in the user message.
pub const PASTED_CONTENT_CAP: usize = 20_000;

/// The banking schema architecture specification handed to the model
/// verbatim as part of every audit system prompt.
pub const BANKING_SCHEMA_INSTRUCTION: &str = r#"
## BANKING SCHEMA ARCHITECTURE (ENBD & Emirates Islamic)

You MUST generate schema following this exact specification:

### 1. CHANNEL DETECTION
- **ENBD**: emiratesnbd.com
- **Emirates Islamic (EI)**: emiratesislamic.ae

### 2. MANDATORY NODES (All Pages)
Always include these 4 base nodes:
- Organization (from channel preset)
- WebSite (from channel preset)
- WebPage (populated from content)
- BreadcrumbList (from URL structure)

### 3. PAGE TYPE & CONDITIONAL NODES

**ProductPage** (if content mentions: credit card, account, loan, finance, mortgage, deposit):
- FinancialProduct + Product (dual type: ["FinancialProduct", "Product"])
- FAQPage (if Q&A content exists)
- HowTo – Apply (always for products)
- HowTo – Usage/Rewards (only if rewards/miles/cashback mentioned)
- ItemList (only if related products mentioned)
- SpecialAnnouncement (only if active offer/promotion)

**CampaignPage** (if content mentions: offer, limited time, promotion):
- SpecialAnnouncement
- FAQPage (if Q&A exists)
- HowTo – Apply/Participate

**PressRelease** (if content mentions: announces, launched, partnership, award):
- NewsArticle

**BlogArticle** (if content mentions: guide, tips, how to, explained):
- Article
- FAQPage (if Q&A exists)
- HowTo (if instructional)

### 4. ISLAMIC FINANCE TERMINOLOGY (EI Channel Only)
For Emirates Islamic pages, you MUST:
- Use "Profit Rate" instead of "Interest Rate"
- Add Islamic finance aliases to alternateName:
  * Credit Card → add "Islamic credit card UAE", "Sharia compliant credit card", "Murabaha credit card", "halal credit card UAE"
  * Home Finance → add "Ijara home finance", "Murabaha mortgage", "Islamic mortgage UAE"
  * Personal Finance → add "Murabaha personal finance", "Islamic personal loan"
  * Savings → add "Mudaraba savings account", "Islamic savings UAE"
  * Business Finance → add "Musharaka business finance", "Islamic SME loan"

### 5. @ID ANCHOR PATTERNS
Use these exact patterns:
- Organization: https://www.emiratesnbd.com/#organization (with trailing slash before #)
- WebSite: https://www.emiratesnbd.com/#website (with trailing slash before #)
- WebPage: [PAGE_URL]#webpage (NO trailing slash before #)
- FinancialProduct: [PAGE_URL]#card
- FAQPage: [PAGE_URL]#faq
- HowTo Apply: [PAGE_URL]#howto-apply
- HowTo Usage: [PAGE_URL]#howto-usage
- BreadcrumbList: [PAGE_URL]#breadcrumb
- SpecialAnnouncement: [PAGE_URL]#offer-announcement

### 6. CRITICAL RULES
- NO AggregateRating, Review, or VideoObject for banking products
- NO HTML in FAQPage acceptedAnswer.text (plain text only)
- Every node MUST have an @id
- All @id cross-references must be consistent
- AlternateName MUST include both generic and Islamic finance terms (for EI)
- FinancialProduct MUST use dual type: ["FinancialProduct", "Product"]

### 7. BREADCRUMB LOGIC
Infer from URL path segments. Example:
URL: /en/personal-banking/cards/credit-cards/skywards-infinite
Breadcrumb: Home > Personal Banking > Cards > Credit Cards > Skywards Infinite

Generate BreadcrumbList with proper position and item structure.

### 8. FAQ GENERATION
If content has Q&A section, extract it.
If not, generate minimum 3 relevant FAQs like:
- "What is the [Product Name]?"
- "What are the fees for [Product Name]?"
- "How do I apply for [Product Name]?"
- "Is [Product Name] Sharia compliant?" (for EI only)

Plain text answers only - no HTML tags allowed.

### 9. HOWTO STRUCTURE
**HowTo – Apply** (always for products):
Step 1: Check Eligibility
Step 2: Prepare Documents (Emirates ID, passport, bank statements, salary certificate)
Step 3: Submit Online Application
Step 4: Upload Documents
Step 5: Await Approval (3-5 business days)
Step 6: Activate Card/Account

**HowTo – Usage/Rewards** (only if rewards/miles exist):
Step 1: Spend on Your Card (mention earn rate)
Step 2: Track Your Miles/Points
Step 3: Redeem for Flights/Rewards
Step 4: Claim Welcome Bonus (if applicable)

Return the schema as a complete @graph JSON object with all required nodes.
"#;

/// The JSON result shape embedded in the audit system prompt.
const AUDIT_OUTPUT_SHAPE: &str = r#"Return a valid JSON object with the following structure:
- IMPORTANT: seoVariants array must contain EXACTLY 3 objects
- IMPORTANT: schemaJsonld must be a complete JSON object (not a string) with @context and @graph array
{
  "pageType": "product|campaign|offer|press_release|generic",
  "extraction": {
    "titleCurrent": "string",
    "metaCurrent": "string",
    "h1Current": "string",
    "headings": ["string"],
    "mainTextPreview": "string"
  },
  "seoVariants": [
    {
      "h1": "string",
      "metaTitle": "string",
      "metaDescription": "string",
      "keyphrases": ["string"],
      "rationale": "string",
      "bestFor": "string",
      "justification": "string",
      "situationalComparison": "string"
    }
  ],
  "aiRecommendation": {
    "winnerIndex": 0,
    "expertRationale": "string",
    "comparisonNotes": "string"
  },
  "strategicImpact": {
    "visibilityScore": 0,
    "trustScore": 0,
    "complianceScore": 0,
    "growthRationale": "string",
    "entityLinkage": ["string"]
  },
  "schemaJsonld": {
    "@context": "https://schema.org",
    "@graph": []
  },
  "schemaCommentary": "string",
  "validation": {
    "errors": ["string"],
    "warnings": ["string"],
    "suggestions": ["string"]
  }
}"#;

/// What kind of source the audit user message describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditInputKind<'a> {
    /// Audit a live URL.
    Url(&'a str),
    /// Analyze an uploaded document attached out-of-band.
    Document,
    /// Analyze pasted page source or marketing copy.
    Pasted(&'a str),
}

/// Builds the full audit system instruction for a brand profile.
#[must_use]
pub fn audit_system_prompt(profile: &BrandProfile) -> String {
    let mut prompt = String::with_capacity(BANKING_SCHEMA_INSTRUCTION.len() + 4096);

    prompt.push_str(
        "You are an elite Enterprise SEO Architect specializing in banking and financial \
         services. Your goal is to analyze the provided content and optimize it for Google's \
         \"Helpful Content\" era, LLM search agents, and Rich Snippets.\n\n",
    );

    prompt.push_str(&format!(
        "BRAND CONTEXT: {} ({})\n- Website: https://{}/\n- Logo: {}\n- Org Type: {}\n\n",
        profile.legal_name, profile.name, profile.domain, profile.logo_url, profile.org_type
    ));

    prompt.push_str(
        "### CORE MISSIONS:\n\
         1. **De-noise**: Extract only the core semantic body. Ignore navigation, headers, footers, and sidebars.\n\
         2. **Strategic Audit**: Provide EXACTLY 3 distinct SEO Growth Strategies (variants) optimized for banking products.\n\
         3. **Analytics**: Calculate 0-100 scores for Visibility, Trust, and Compliance.\n\
         4. **World-Class Banking Schema**: Generate comprehensive, specification-compliant schema.org markup.\n",
    );

    prompt.push_str(BANKING_SCHEMA_INSTRUCTION);

    prompt.push_str(
        "\n### CRITICAL CONSTRAINTS:\n\
         - NO mentions of \"AI\", \"Gemini\", or \"LLM\" in user-facing output text.\n\
         - For Emirates Islamic (emiratesislamic.ae): ALWAYS use \"Profit Rate\" instead of \"Interest Rate\"\n\
         - For Emirates Islamic: Include Islamic finance terminology in alternateName (Murabaha, Ijara, etc.)\n\
         - Use \"Strategic Impact\" instead of \"AI Recommendations\"\n\
         - Schema must be a complete @graph JSON object, not a string\n\
         - All @id references must be cross-reference consistent\n\
         - FAQPage answers must be plain text only (no HTML tags)\n\n",
    );

    prompt.push_str(AUDIT_OUTPUT_SHAPE);

    prompt
}

/// Builds the audit user message for the given input kind.
///
/// Pasted content is truncated to [`PASTED_CONTENT_CAP`] characters.
#[must_use]
pub fn audit_user_message(input: AuditInputKind<'_>) -> String {
    match input {
        AuditInputKind::Url(url) => {
            format!("Perform an Enterprise Growth Audit for this URL: {url}")
        }
        AuditInputKind::Document => {
            "Deep-dive analysis of the attached document. Extract core message and technical \
             SEO requirements."
                .to_string()
        }
        AuditInputKind::Pasted(content) => {
            format!(
                "Semantic analysis of provided content: {}",
                truncate_chars(content, PASTED_CONTENT_CAP)
            )
        }
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Fixed assistant framing: role, marker protocol, and output rules.
const CHAT_FRAMING: &str = r#"You are an expert SEO Assistant helping users understand and optimize their SEO strategies. You provide clear, actionable advice about SEO variants, schema markup, and content optimization.

CRITICAL: When users ask you to create, modify, or enhance SEO variants or schema, you MUST:
1. Provide a clear explanation of what you're changing and why
2. Generate the complete new variant or schema wrapped in the EXACT markers shown below
3. ALWAYS include the markers - they are required for the system to detect your output

For NEW SEO VARIANTS, you MUST use this EXACT format (include the markers):
---NEW_VARIANT---
{
  "h1": "Your improved H1 here",
  "metaTitle": "Your improved meta title here",
  "metaDescription": "Your improved meta description here",
  "keyphrases": ["keyword1", "keyword2", "keyword3"],
  "rationale": "Why this variant works",
  "bestFor": "Target audience/use case",
  "justification": "Technical justification",
  "situationalComparison": "How it compares to others"
}
---END_VARIANT---

For SCHEMA MODIFICATIONS or ENHANCEMENTS, you MUST use this EXACT format (include the markers):
---NEW_SCHEMA---
{
  "@context": "https://schema.org",
  "@graph": [
    {
      "@type": "Organization",
      "...": "..."
    }
  ]
}
---END_SCHEMA---

IMPORTANT RULES:
- ALWAYS wrap JSON output in the markers (---NEW_VARIANT--- or ---NEW_SCHEMA---)
- Do NOT use markdown code blocks (no ```json)
- The markers MUST be on their own lines
- Without the markers, the user won't see the "Add to Dashboard" button
- If user asks for schema enhancement, ALWAYS include ---NEW_SCHEMA--- markers"#;

/// Builds the assistant system prompt, appending a compact context block
/// describing the active generation when one is present.
#[must_use]
pub fn chat_system_prompt(context: Option<&Generation>) -> String {
    let Some(generation) = context else {
        return CHAT_FRAMING.to_string();
    };

    let mut prompt = String::with_capacity(CHAT_FRAMING.len() + 2048);
    prompt.push_str(CHAT_FRAMING);

    prompt.push_str("\n\nCurrent SEO Generation Context:\n");
    prompt.push_str(&format!("- URL: {}\n", generation.url));
    prompt.push_str(&format!("- Page Type: {}\n", generation.page_type));
    prompt.push_str(&format!("- Model Used: {}\n", generation.model_provider));

    if !generation.seo_variants.is_empty() {
        prompt.push_str("\nSEO Variants:\n");
        for (idx, variant) in generation.seo_variants.iter().enumerate() {
            prompt.push_str(&format!("\nVariant {}:\n", idx + 1));
            prompt.push_str(&format!("- H1: {}\n", variant.h1));
            prompt.push_str(&format!("- Meta Title: {}\n", variant.meta_title));
            prompt.push_str(&format!("- Meta Description: {}\n", variant.meta_description));
            prompt.push_str(&format!("- Best For: {}\n", variant.best_for));
            prompt.push_str(&format!("- Keyphrases: {}\n", variant.keyphrases.join(", ")));
        }
    }

    if let Some(rec) = &generation.ai_recommendation {
        prompt.push_str(&format!(
            "\nRecommended Variant: Variant {}\nRationale: {}\n",
            rec.winner_index + 1,
            rec.expert_rationale
        ));
    }

    if let Some(impact) = &generation.strategic_impact {
        prompt.push_str("\nStrategic Impact Scores:\n");
        prompt.push_str(&format!("- Visibility: {}/100\n", impact.visibility_score));
        prompt.push_str(&format!("- Trust: {}/100\n", impact.trust_score));
        prompt.push_str(&format!("- Compliance: {}/100\n", impact.compliance_score));
    }

    if !generation.schema_jsonld.is_null() {
        let pretty = serde_json::to_string_pretty(&generation.schema_jsonld)
            .unwrap_or_else(|_| generation.schema_jsonld.to_string());
        prompt.push_str(&format!("\nCurrent Schema:\n{pretty}\n"));
    }

    prompt
}
