use url::Url;

/// Schemes that never point at a fetchable resource
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Resolves an `href`/`src` attribute to an absolute HTTP(S) URL
///
/// Returns None if the reference should be excluded:
/// - empty references
/// - fragment-only references (same page anchors)
/// - `javascript:`, `mailto:`, `tel:` and `data:` references
/// - references that cannot be joined onto `base_url`
/// - anything that is not HTTP(S) after resolution
pub fn resolve_reference(reference: &str, base_url: &Url) -> Option<String> {
    let reference = reference.trim();

    if reference.is_empty() || reference.starts_with('#') {
        return None;
    }

    let lowered = reference.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
        return None;
    }

    match base_url.join(reference) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}

/// Picks the base URL used for resolving references on a page
///
/// A `<base href>` value wins when it resolves against the document URL,
/// otherwise the document URL itself is used.
pub fn resolve_base(base_href: Option<&str>, document_url: &Url) -> Url {
    base_href
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .and_then(|href| document_url.join(href).ok())
        .filter(|url| url.scheme() == "http" || url.scheme() == "https")
        .unwrap_or_else(|| document_url.clone())
}
