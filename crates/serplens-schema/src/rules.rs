//! Fixed rule tables: detection signals, alias lists, terminology mapping,
//! and the per-channel organization/website preset nodes.

use serde_json::{json, Value};

use crate::Channel;

/// Page-type detection signals, scanned in declaration order.
///
/// The order is significant: content frequently matches several categories
/// (a campaign page about a credit card trips both ProductPage and
/// CampaignPage signals), and the first match decides which conditional
/// schema nodes get requested. Do not reorder.
pub const PAGE_TYPE_SIGNALS: &[(&str, &[&str])] = &[
    (
        "ProductPage",
        &[
            "credit card",
            "account",
            "loan",
            "finance",
            "mortgage",
            "deposit",
            "personal finance",
            "home finance",
            "auto finance",
            "savings",
        ],
    ),
    (
        "CampaignPage",
        &[
            "offer",
            "limited time",
            "apply now",
            "promotion",
            "win",
            "cashback",
            "exclusive deal",
            "seasonal",
        ],
    ),
    (
        "PressRelease",
        &[
            "announces",
            "launched",
            "partnership",
            "award",
            "milestone",
            "appointed",
            "signed",
        ],
    ),
    (
        "BlogArticle",
        &[
            "guide",
            "tips",
            "how to",
            "explained",
            "what is",
            "vs",
            "comparison",
            "understanding",
            "top 5",
            "top 10",
        ],
    ),
    (
        "BranchPage",
        &["branch", "location", "atm", "address", "opening hours", "find us"],
    ),
    (
        "SupportPage",
        &["help", "faq", "contact us", "documents required", "how do i", "support"],
    ),
    (
        "ListingPage",
        &["all credit cards", "compare cards", "all accounts", "full list", "browse"],
    ),
];

/// Travel/rewards card aliases added for any card product, both channels.
pub const GENERIC_CREDIT_CARD_ALIASES: &[&str] = &[
    "travel credit card UAE",
    "Skywards miles card",
    "Emirates miles credit card",
    "premium travel card UAE",
    "airport lounge card UAE",
    "Visa Infinite card UAE",
    "best travel credit card UAE",
    "rewards credit card UAE",
];

/// Card aliases added only on the Emirates Islamic channel.
pub const ISLAMIC_CREDIT_CARD_ALIASES: &[&str] = &[
    "Islamic credit card UAE",
    "Sharia compliant credit card",
    "halal credit card UAE",
    "Islamic finance card",
    "Murabaha credit card",
    "Islamic travel card UAE",
    "Emirates Islamic finance card",
    "profit rate card UAE",
    "no interest credit card UAE",
];

/// Maps a conventional finance product type to its Islamic finance
/// contract terms and the conventional search aliases it should carry.
pub struct FinanceMapping {
    pub product_key: &'static str,
    pub islamic_terms: &'static [&'static str],
    pub conventional_aliases: &'static [&'static str],
}

/// Islamic finance terminology table for the EI channel. Every entry whose
/// key appears in the product type contributes aliases: breadth, not
/// first-match.
pub const ISLAMIC_FINANCE_MAPPING: &[FinanceMapping] = &[
    FinanceMapping {
        product_key: "home finance",
        islamic_terms: &["Ijara", "Murabaha"],
        conventional_aliases: &["mortgage", "home loan", "property loan", "housing loan UAE"],
    },
    FinanceMapping {
        product_key: "personal finance",
        islamic_terms: &["Murabaha"],
        conventional_aliases: &["personal loan", "cash loan", "unsecured loan UAE"],
    },
    FinanceMapping {
        product_key: "auto finance",
        islamic_terms: &["Murabaha", "Ijara"],
        conventional_aliases: &["car loan", "auto loan", "vehicle finance UAE"],
    },
    FinanceMapping {
        product_key: "savings account",
        islamic_terms: &["Mudaraba"],
        conventional_aliases: &["savings account", "deposit account", "interest-free savings"],
    },
    FinanceMapping {
        product_key: "fixed deposit",
        islamic_terms: &["Wakala"],
        conventional_aliases: &["fixed deposit", "term deposit", "investment account UAE"],
    },
    FinanceMapping {
        product_key: "business finance",
        islamic_terms: &["Musharaka", "Murabaha"],
        conventional_aliases: &["business loan", "SME loan", "corporate finance UAE"],
    },
    FinanceMapping {
        product_key: "current account",
        islamic_terms: &["Qard"],
        conventional_aliases: &["current account", "checking account", "bank account UAE"],
    },
    FinanceMapping {
        product_key: "credit card",
        islamic_terms: &["Murabaha-based card"],
        conventional_aliases: &["credit card", "rewards card", "charge card"],
    },
];

fn channel_base_url(channel: Channel) -> &'static str {
    match channel {
        Channel::Enbd => "https://www.emiratesnbd.com",
        Channel::Ei => "https://www.emiratesislamic.ae",
    }
}

/// The channel's preset `Organization` node.
#[must_use]
pub fn organization_node(channel: Channel) -> Value {
    match channel {
        Channel::Enbd => json!({
            "@type": "Organization",
            "@id": "https://www.emiratesnbd.com/#organization",
            "name": "Emirates NBD",
            "alternateName": [
                "ENBD",
                "Emirates NBD Bank",
                "Emirates National Bank of Dubai",
                "Emirates NBD PJSC"
            ],
            "url": "https://www.emiratesnbd.com",
            "logo": {
                "@type": "ImageObject",
                "url": "https://www.emiratesnbd.com/assets/en/images/logo.svg",
                "width": 200,
                "height": 60
            },
            "description": "Emirates NBD is one of the leading banking groups in the Middle East and North Africa, headquartered in Dubai, UAE, offering retail, corporate, Islamic and investment banking services.",
            "foundingDate": "2007",
            "areaServed": { "@type": "Country", "name": "United Arab Emirates" },
            "sameAs": [
                "https://en.wikipedia.org/wiki/Emirates_NBD",
                "https://www.linkedin.com/company/emirates-nbd",
                "https://twitter.com/emiratesnbd",
                "https://www.facebook.com/EmiratesNBD",
                "https://www.wikidata.org/wiki/Q5372506"
            ]
        }),
        Channel::Ei => json!({
            "@type": "Organization",
            "@id": "https://www.emiratesislamic.ae/#organization",
            "name": "Emirates Islamic",
            "alternateName": [
                "EI",
                "Emirates Islamic Bank",
                "Emirates Islamic PJSC",
                "EIB",
                "Emirates Islamic Financial Institution",
                "Emirates NBD Islamic Banking Arm",
                "Emirates Islamic – Sharia Compliant Banking"
            ],
            "url": "https://www.emiratesislamic.ae",
            "logo": {
                "@type": "ImageObject",
                "url": "https://www.emiratesislamic.ae/-/media/ei/images/header/emirates-islamic-logo.svg",
                "width": 200,
                "height": 60
            },
            "description": "Emirates Islamic is a leading Islamic bank in the UAE, offering Sharia-compliant retail and corporate banking products including financing, savings, cards, and investment solutions.",
            "foundingDate": "2004",
            "areaServed": { "@type": "Country", "name": "United Arab Emirates" },
            "sameAs": [
                "https://en.wikipedia.org/wiki/Emirates_Islamic_Bank",
                "https://www.linkedin.com/company/emirates-islamic",
                "https://www.twitter.com/emiratesislamic",
                "https://www.wikidata.org/wiki/Q5372510"
            ]
        }),
    }
}

/// The channel's preset `WebSite` node, including the site SearchAction.
#[must_use]
pub fn website_node(channel: Channel) -> Value {
    let base_url = channel_base_url(channel);
    let name = match channel {
        Channel::Enbd => "Emirates NBD",
        Channel::Ei => "Emirates Islamic",
    };

    json!({
        "@type": "WebSite",
        "@id": format!("{base_url}/#website"),
        "url": base_url,
        "name": name,
        "publisher": { "@id": format!("{base_url}/#organization") },
        "potentialAction": {
            "@type": "SearchAction",
            "target": {
                "@type": "EntryPoint",
                "urlTemplate": format!("{base_url}/search?q={{search_term_string}}")
            },
            "query-input": "required name=search_term_string"
        }
    })
}
