//! Banking schema rules for the ENBD and Emirates Islamic channels.
//!
//! Channel-specific organization presets, page-type detection signals,
//! Islamic-finance terminology mapping, `@id` anchor conventions, and the
//! prompt text that instructs the model to follow all of the above.

mod aliases;
mod classify;
mod ids;
mod prompt;
mod rules;

pub use aliases::generate_alternate_names;
pub use classify::{detect_channel, detect_page_type};
pub use ids::build_id;
pub use prompt::{
    audit_system_prompt, audit_user_message, chat_system_prompt, AuditInputKind,
    BANKING_SCHEMA_INSTRUCTION, PASTED_CONTENT_CAP,
};
pub use rules::{
    organization_node, website_node, FinanceMapping, GENERIC_CREDIT_CARD_ALIASES,
    ISLAMIC_CREDIT_CARD_ALIASES, ISLAMIC_FINANCE_MAPPING, PAGE_TYPE_SIGNALS,
};

/// Which institution's identity and terminology preset applies.
///
/// Derived from the request's domain on every audit, never supplied by the
/// caller or cached across requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Emirates NBD, the primary (conventional banking) channel.
    Enbd,
    /// Emirates Islamic, the Sharia-compliant channel.
    Ei,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Enbd => write!(f, "ENBD"),
            Channel::Ei => write!(f, "EI"),
        }
    }
}
