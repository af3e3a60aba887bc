//! URL handling module for WebScraper
//!
//! This module provides caller-side validation of requested URLs and
//! resolution of page-relative references found in HTML.

mod resolve;

use crate::ValidationError;
use url::Url;

pub use resolve::{resolve_base, resolve_reference};

/// Validates a URL supplied by a caller before it is scraped
///
/// # Rules
///
/// 1. Surrounding whitespace is ignored; an empty string is rejected
/// 2. The URL must parse as an absolute URL
/// 3. The scheme must be `http` or `https`
/// 4. The URL must carry a host
///
/// # Examples
///
/// ```
/// use webscraper::url::validate_url;
///
/// let url = validate_url("  https://example.com/page ").unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
///
/// assert!(validate_url("ftp://example.com/").is_err());
/// assert!(validate_url("/relative/path").is_err());
/// ```
pub fn validate_url(input: &str) -> Result<Url, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    let url = Url::parse(trimmed).map_err(|e| ValidationError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ValidationError::InvalidScheme(format!(
            "Only HTTP and HTTPS protocols are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(ValidationError::MissingHost),
    }
}
