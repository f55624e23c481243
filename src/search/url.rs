//! Website normalization for reference-URL searches.

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn scheme_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^https?://").expect("static regex is valid"))
}

/// Reduce a website to `host[/path]`.
///
/// The scheme, query, fragment and trailing slashes are dropped; the host
/// and path are kept exactly as written so the result still occurs inside
/// the stored reference URLs. Input that is not a valid URL falls back to
/// everything before the first `/`. The result is stable under repeated
/// normalization.
pub fn normalize_website(website: &str) -> String {
    let trimmed = website.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let cleaned = scheme_regex().replace(trimmed, "");

    if let Err(e) = Url::parse(&format!("http://{cleaned}")) {
        tracing::warn!("Failed to parse URL {}: {}", website, e);
        return cleaned.split('/').next().unwrap_or_default().to_string();
    }

    let end = cleaned.find(['?', '#']).unwrap_or(cleaned.len());
    let location = &cleaned[..end];
    let (domain, path) = location.split_at(location.find('/').unwrap_or(location.len()));
    format!("{domain}{}", path.trim_end_matches('/'))
}
