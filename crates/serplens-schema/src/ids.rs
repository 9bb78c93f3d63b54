//! `@id` anchor construction.

/// Build a schema `@id` anchor for a node.
///
/// Organization and WebSite anchor to the site root with a trailing slash
/// before the fragment (`https://domain/#organization`); every other node
/// anchors to the page URL stripped of query and fragment, with no slash
/// inserted (`{pageUrl}#faq`).
#[must_use]
pub fn build_id(page_url: &str, anchor: &str) -> String {
    let clean_url = strip_query_and_fragment(page_url);

    if anchor == "organization" || anchor == "website" {
        let domain = extract_origin(clean_url).unwrap_or(clean_url);
        return format!("{domain}/#{anchor}");
    }

    format!("{clean_url}#{anchor}")
}

fn strip_query_and_fragment(url: &str) -> &str {
    let url = url.split('?').next().unwrap_or(url);
    url.split('#').next().unwrap_or(url)
}

/// `https://host` portion of the URL, if it has an http(s) scheme.
fn extract_origin(url: &str) -> Option<&str> {
    let rest = url
        .strip_prefix("https://")
        .map(|r| (r, "https://".len()))
        .or_else(|| url.strip_prefix("http://").map(|r| (r, "http://".len())));

    let (after_scheme, scheme_len) = rest?;
    if after_scheme.is_empty() {
        return None;
    }

    let host_end = after_scheme
        .find('/')
        .map_or(url.len(), |idx| scheme_len + idx);
    Some(&url[..host_end])
}
