//! Alternate-name generation for product schema nodes.

use crate::rules::{
    GENERIC_CREDIT_CARD_ALIASES, ISLAMIC_CREDIT_CARD_ALIASES, ISLAMIC_FINANCE_MAPPING,
};
use crate::Channel;

/// Produce descriptive search aliases for a product.
///
/// Card products receive the generic travel/rewards alias list, plus the
/// Islamic card list on the EI channel. On the EI channel every
/// terminology-mapping entry whose key appears in `product_type`
/// contributes its conventional aliases and `"{term} {product_type}"`
/// combinations; all matching entries accumulate, not just the first.
/// Two product-name variations close the list, and duplicates are removed
/// preserving first-seen order.
#[must_use]
pub fn generate_alternate_names(
    product_type: &str,
    channel: Channel,
    product_name: &str,
) -> Vec<String> {
    let mut aliases: Vec<String> = Vec::new();
    let lower_type = product_type.to_lowercase();

    if lower_type.contains("credit card") || lower_type.contains("card") {
        aliases.extend(GENERIC_CREDIT_CARD_ALIASES.iter().map(ToString::to_string));

        if channel == Channel::Ei {
            aliases.extend(ISLAMIC_CREDIT_CARD_ALIASES.iter().map(ToString::to_string));
        }
    }

    if channel == Channel::Ei {
        for mapping in ISLAMIC_FINANCE_MAPPING {
            if lower_type.contains(mapping.product_key) {
                aliases.extend(mapping.conventional_aliases.iter().map(ToString::to_string));
                aliases.extend(
                    mapping
                        .islamic_terms
                        .iter()
                        .map(|term| format!("{term} {product_type}")),
                );
            }
        }
    }

    aliases.push(format!("{product_name} UAE"));
    aliases.push(format!("{product_name} Dubai"));

    dedup_preserving_order(aliases)
}

fn dedup_preserving_order(aliases: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    aliases
        .into_iter()
        .filter(|alias| seen.insert(alias.clone()))
        .collect()
}
