//! HTML metadata extraction
//!
//! This module turns a fetched body into the metadata stored for a page:
//! - Title, description, keywords, author, site name and social image
//! - Document language and favicon
//! - Links and images (absolute URLs, capped)
//! - Visible word count
//!
//! Parsing is permissive: malformed markup never fails extraction, missing
//! elements simply leave the corresponding field empty. The only error is a
//! body that cannot be decoded as text at all.

use crate::config::ScrapingConfig;
use crate::scrape::fetcher::FetchedPage;
use crate::url::{resolve_base, resolve_reference};
use crate::ExtractError;
use encoding_rs::{Encoding, UTF_8};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Content types that are never treated as markup
const BINARY_PREFIXES: &[&str] = &[
    "image/",
    "audio/",
    "video/",
    "font/",
    "application/octet-stream",
    "application/pdf",
    "application/zip",
    "application/gzip",
    "application/x-tar",
    "application/vnd.",
];

/// Elements whose text is never rendered
const HIDDEN_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// How many leading characters are inspected for NUL characters
const SNIFF_LEN: usize = 1024;

/// How many leading bytes are searched for an in-document charset
const META_SNIFF_LEN: usize = 1024;

/// Elements that break the text flow when rendered
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Caps applied to collected links and images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractLimits {
    pub max_links: usize,
    pub max_images: usize,
}

impl From<&ScrapingConfig> for ExtractLimits {
    fn from(config: &ScrapingConfig) -> Self {
        Self {
            max_links: config.max_links,
            max_images: config.max_images,
        }
    }
}

/// Metadata extracted from one HTML document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    pub favicon: Option<String>,
    pub image_url: Option<String>,
    pub site_name: Option<String>,
    pub links: Vec<String>,
    pub images: Vec<String>,
    pub word_count: u64,
}

/// A `<meta>` attribute to match, in priority order
#[derive(Debug, Clone, Copy)]
enum MetaKey {
    /// `<meta name="...">`
    Name(&'static str),
    /// `<meta property="...">`, also accepted via `name`
    Property(&'static str),
}

const DESCRIPTION_KEYS: &[MetaKey] = &[
    MetaKey::Name("description"),
    MetaKey::Property("og:description"),
    MetaKey::Name("twitter:description"),
];
const KEYWORDS_KEYS: &[MetaKey] = &[MetaKey::Name("keywords")];
const AUTHOR_KEYS: &[MetaKey] = &[MetaKey::Name("author"), MetaKey::Property("article:author")];
const SITE_NAME_KEYS: &[MetaKey] = &[
    MetaKey::Property("og:site_name"),
    MetaKey::Name("application-name"),
];
const IMAGE_KEYS: &[MetaKey] = &[
    MetaKey::Property("og:image"),
    MetaKey::Property("og:image:url"),
    MetaKey::Name("twitter:image"),
];

/// Extracts metadata from a fetched page
///
/// # Arguments
///
/// * `page` - The fetched page (body, content type and final URL)
/// * `limits` - Caps for the collected links and images
///
/// # Returns
///
/// * `Ok(PageMetadata)` - Extracted metadata
/// * `Err(ExtractError::Unparseable)` - The body is binary or not decodable
pub fn extract(page: &FetchedPage, limits: ExtractLimits) -> Result<PageMetadata, ExtractError> {
    let html = decode_body(page)?;
    Ok(parse_html(&html, &page.final_url, limits))
}

/// Parses HTML content and extracts metadata
///
/// # Field Rules
///
/// First non-empty match wins; attribute values compare case-insensitively.
///
/// | Field | Source |
/// |-------|--------|
/// | title | first `<title>` |
/// | description | `name=description`, `og:description`, `twitter:description` |
/// | keywords | `name=keywords` |
/// | author | `name=author`, `article:author` |
/// | site_name | `og:site_name`, `name=application-name` |
/// | image_url | `og:image`, `og:image:url`, `twitter:image` |
/// | language | `lang` on the root element |
/// | favicon | first `<link>` whose `rel` contains `icon` |
/// | links | every `a[href]`, resolved, capped |
/// | images | every `img[src]`, resolved, capped |
///
/// # Example
///
/// ```
/// use url::Url;
/// use webscraper::scrape::{parse_html, ExtractLimits};
///
/// let html = r#"<html lang="en"><head><title>Test</title></head>
///               <body><a href="/page">Link</a> two words</body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let limits = ExtractLimits { max_links: 10, max_images: 10 };
///
/// let parsed = parse_html(html, &base_url, limits);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// assert_eq!(parsed.word_count, 3);
/// ```
pub fn parse_html(html: &str, document_url: &Url, limits: ExtractLimits) -> PageMetadata {
    let document = Html::parse_document(html);

    let base_href = first_element(&document, "base[href]").and_then(|e| e.value().attr("href"));
    let base_url = resolve_base(base_href, document_url);

    PageMetadata {
        title: extract_title(&document),
        description: meta_content(&document, DESCRIPTION_KEYS),
        keywords: meta_content(&document, KEYWORDS_KEYS),
        author: meta_content(&document, AUTHOR_KEYS),
        language: extract_language(&document),
        favicon: extract_favicon(&document, &base_url),
        image_url: meta_content(&document, IMAGE_KEYS)
            .and_then(|src| resolve_reference(&src, &base_url)),
        site_name: meta_content(&document, SITE_NAME_KEYS),
        links: collect_references(&document, "a[href]", "href", &base_url, limits.max_links),
        images: collect_references(&document, "img[src]", "src", &base_url, limits.max_images),
        word_count: count_words(&document),
    }
}

/// Decodes the body as text, rejecting binary payloads
fn decode_body(page: &FetchedPage) -> Result<String, ExtractError> {
    let mime = page
        .content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    if BINARY_PREFIXES.iter().any(|prefix| mime.starts_with(prefix)) {
        tracing::warn!("Refusing to parse {} as HTML ({})", page.url, mime);
        return Err(unparseable(page, format!("binary content type {}", mime)));
    }

    let encoding = detect_encoding(page);
    let (text, _, had_errors) = encoding.decode(&page.body);

    if text.chars().take(SNIFF_LEN).any(|c| c == '\0') {
        tracing::warn!("Body of {} contains NUL characters", page.url);
        return Err(unparseable(page, "body contains NUL characters".to_string()));
    }

    if had_errors {
        let total = text.chars().count();
        let replaced = text.chars().filter(|&c| c == char::REPLACEMENT_CHARACTER).count();
        // More than 10% undecodable characters means this is not text
        if replaced * 10 > total {
            return Err(unparseable(
                page,
                format!("{} of {} characters not valid {}", replaced, total, encoding.name()),
            ));
        }
    }

    Ok(text.into_owned())
}

fn unparseable(page: &FetchedPage, reason: String) -> ExtractError {
    ExtractError::Unparseable {
        url: page.url.clone(),
        reason,
    }
}

/// Returns the `charset` parameter of a Content-Type value
fn charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Picks the body encoding: byte order mark, then the Content-Type charset,
/// then a charset declared early in the document, then UTF-8
fn detect_encoding(page: &FetchedPage) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(&page.body) {
        return encoding;
    }

    charset(&page.content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| meta_charset(&page.body))
        .unwrap_or(UTF_8)
}

/// Finds a `charset=` declaration in the first bytes of the document
///
/// Covers both `<meta charset="...">` and the `http-equiv` content form.
fn meta_charset(body: &[u8]) -> Option<&'static Encoding> {
    let head = &body[..body.len().min(META_SNIFF_LEN)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let start = head.find("<meta")?;
    let rest = &head[start..];
    let value = &rest[rest.find("charset=")? + "charset=".len()..];
    let label: String = value
        .trim_start_matches(|c: char| c == '"' || c == '\'' || c == ' ')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(*c, '-' | '_' | ':' | '.'))
        .collect();

    match Encoding::for_label(label.as_bytes())? {
        // A document that reached here as ASCII-compatible bytes cannot be UTF-16
        enc if enc == encoding_rs::UTF_16LE || enc == encoding_rs::UTF_16BE => Some(UTF_8),
        enc => Some(enc),
    }
}

fn first_element<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    first_element(document, "title")
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Reads the `lang` attribute of the root element
fn extract_language(document: &Html) -> Option<String> {
    document
        .root_element()
        .value()
        .attr("lang")
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
}

/// Returns the `content` of the first `<meta>` matching the keys, by key priority
fn meta_content(document: &Html, keys: &[MetaKey]) -> Option<String> {
    let selector = Selector::parse("meta[content]").ok()?;
    let metas: Vec<ElementRef<'_>> = document.select(&selector).collect();

    let attr_matches = |meta: &ElementRef<'_>, attr: &str, expected: &str| {
        meta.value()
            .attr(attr)
            .map_or(false, |value| value.trim().eq_ignore_ascii_case(expected))
    };

    for key in keys {
        for meta in &metas {
            let matched = match *key {
                MetaKey::Name(name) => attr_matches(meta, "name", name),
                MetaKey::Property(property) => {
                    attr_matches(meta, "property", property) || attr_matches(meta, "name", property)
                }
            };
            if !matched {
                continue;
            }

            let content = meta.value().attr("content").unwrap_or("").trim();
            if !content.is_empty() {
                return Some(content.to_string());
            }
        }
    }

    None
}

/// Finds the first `<link>` with an `icon` relation and resolves its target
fn extract_favicon(document: &Html, base_url: &Url) -> Option<String> {
    let selector = Selector::parse("link[rel][href]").ok()?;

    document
        .select(&selector)
        .filter(|link| {
            link.value()
                .attr("rel")
                .map_or(false, |rel| {
                    rel.split_ascii_whitespace()
                        .any(|token| token.eq_ignore_ascii_case("icon"))
                })
        })
        .find_map(|link| resolve_reference(link.value().attr("href")?, base_url))
}

/// Collects resolved attribute values in document order, keeping duplicates
fn collect_references(
    document: &Html,
    css: &str,
    attr: &str,
    base_url: &Url,
    limit: usize,
) -> Vec<String> {
    let selector = match Selector::parse(css) {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| resolve_reference(element.value().attr(attr)?, base_url))
        .take(limit)
        .collect()
}

/// Counts whitespace-delimited tokens in the rendered text of `<body>`
///
/// Text inside script, style, noscript and template elements is skipped.
/// Inline elements join their text with the surrounding words; block
/// elements separate it.
fn count_words(document: &Html) -> u64 {
    let body = first_element(document, "body").unwrap_or_else(|| document.root_element());

    let mut rendered = String::new();
    render_text(body, &mut rendered);
    rendered.split_whitespace().count() as u64
}

/// Appends the visible text of an element in document order
fn render_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            let name = child.value().name();
            if HIDDEN_TEXT_ELEMENTS.contains(&name) {
                continue;
            }

            let block = BLOCK_ELEMENTS.contains(&name);
            if block {
                out.push(' ');
            }
            render_text(child, out);
            if block {
                out.push(' ');
            }
        }
    }
}
