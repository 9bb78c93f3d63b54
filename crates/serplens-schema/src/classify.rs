//! Channel and page-type detection. Both functions are total: any input
//! maps to a channel / label, with the primary channel and `"WebPage"` as
//! the defaults.

use crate::rules::PAGE_TYPE_SIGNALS;
use crate::Channel;

/// Detect the banking channel from a domain or full URL.
///
/// Case-insensitive substring match; anything that is not recognizably
/// Emirates Islamic falls back to the ENBD channel.
#[must_use]
pub fn detect_channel(domain_or_url: &str) -> Channel {
    let domain = domain_or_url.to_lowercase();
    if domain.contains("emiratesislamic.ae") || domain.contains("ei.ae") {
        Channel::Ei
    } else {
        Channel::Enbd
    }
}

/// Detect the page-type label from content signals.
///
/// Scans [`PAGE_TYPE_SIGNALS`] in declaration order and returns the first
/// category with any matching trigger phrase. The ordering is a behavioral
/// contract: it decides which conditional schema nodes get requested when
/// content matches several categories.
#[must_use]
pub fn detect_page_type(content: &str) -> &'static str {
    let lower = content.to_lowercase();

    for (page_type, signals) in PAGE_TYPE_SIGNALS {
        if signals.iter().any(|signal| lower.contains(signal)) {
            return page_type;
        }
    }

    "WebPage"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_channel_matches_ei_domain_any_case() {
        assert_eq!(detect_channel("WWW.EMIRATESISLAMIC.AE/en"), Channel::Ei);
        assert_eq!(
            detect_channel("https://www.emiratesislamic.ae/en/cards"),
            Channel::Ei
        );
        assert_eq!(detect_channel("ei.ae"), Channel::Ei);
    }

    #[test]
    fn detect_channel_defaults_to_enbd() {
        assert_eq!(detect_channel("www.emiratesnbd.com"), Channel::Enbd);
        assert_eq!(detect_channel("example.com"), Channel::Enbd);
        assert_eq!(detect_channel(""), Channel::Enbd);
    }

    #[test]
    fn detect_page_type_first_declared_category_wins() {
        // Matches both ProductPage ("credit card") and CampaignPage
        // ("limited time", "offer"); ProductPage is declared first.
        let content = "Limited time offer on our new credit card";
        assert_eq!(detect_page_type(content), "ProductPage");
    }

    #[test]
    fn detect_page_type_campaign_without_product_signals() {
        assert_eq!(
            detect_page_type("Exclusive deal: win big this seasonal promotion"),
            "CampaignPage"
        );
    }

    #[test]
    fn detect_page_type_press_release() {
        assert_eq!(
            detect_page_type("The bank announces a new partnership"),
            "PressRelease"
        );
    }

    #[test]
    fn detect_page_type_is_case_insensitive() {
        assert_eq!(detect_page_type("APPLY NOW for CASHBACK"), "CampaignPage");
        assert_eq!(detect_page_type("Find our nearest ATM"), "BranchPage");
    }

    #[test]
    fn detect_page_type_defaults_to_webpage() {
        assert_eq!(detect_page_type("completely unrelated prose"), "WebPage");
        assert_eq!(detect_page_type(""), "WebPage");
    }
}
