//! HTTP fetcher implementation
//!
//! This module issues the single outbound request made for a scrape:
//! - Building the HTTP client with the configured user agent and timeout
//! - GET request with redirect following
//! - Bounded body reading
//! - Error classification (timeout / network / too large)

use crate::config::ScrapingConfig;
use crate::FetchError;
use reqwest::header::HeaderMap;
use reqwest::{redirect::Policy, Client};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// Upper bound on the connect phase, independent of the overall timeout
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Raw outcome of a successful fetch
///
/// Any status code counts as a successful fetch; interpreting non-2xx
/// responses is up to the caller.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL as requested
    pub url: String,
    /// URL after redirects, used as the base for relative references
    pub final_url: Url,
    /// HTTP status code
    pub status_code: u16,
    /// Response headers keyed by lowercase name
    pub headers: BTreeMap<String, String>,
    /// Content-Type header value, empty if absent
    pub content_type: String,
    /// Page body, never longer than the configured maximum
    pub body: Vec<u8>,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The scraping configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use webscraper::config::ScrapingConfig;
/// use webscraper::scrape::build_http_client;
///
/// let client = build_http_client(&ScrapingConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &ScrapingConfig) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.timeout);
    let connect_timeout = Duration::from_secs(config.timeout.min(CONNECT_TIMEOUT_SECS));

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues bounded GET requests
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_body_bytes: usize,
}

impl Fetcher {
    /// Creates a fetcher from the scraping configuration
    ///
    /// Fails with `FetchError::Client` when the client cannot be built,
    /// e.g. for a user agent that is not a valid header value.
    pub fn new(config: &ScrapingConfig) -> Result<Self, FetchError> {
        let client = build_http_client(config).map_err(FetchError::Client)?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, max_body_bytes: usize) -> Self {
        Self {
            client,
            max_body_bytes,
        }
    }

    /// Fetches a URL with a single GET request
    ///
    /// # Request Flow
    ///
    /// 1. Send GET (redirects followed by the client, max 10 hops)
    /// 2. Reject early if `Content-Length` exceeds the body limit
    /// 3. Stream the body chunk by chunk, abandoning it once the limit is crossed
    ///
    /// # Error Classification
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Timeout (connect, headers or body) | `FetchError::Timeout` |
    /// | DNS / connection / TLS / malformed URL | `FetchError::Network` |
    /// | Body larger than `max_body_bytes` | `FetchError::TooLarge` |
    /// | Any HTTP status | success |
    ///
    /// No retries are attempted.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().clone();
        let headers = collect_headers(response.headers());
        let content_type = headers.get("content-type").cloned().unwrap_or_default();

        if let Some(declared) = response.content_length() {
            if declared > self.max_body_bytes as u64 {
                tracing::warn!(
                    "Declared body of {} is {} bytes, limit is {}",
                    url,
                    declared,
                    self.max_body_bytes
                );
                return Err(self.too_large(url));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| classify_error(url, e))?
        {
            if body.len() + chunk.len() > self.max_body_bytes {
                tracing::warn!(
                    "Body of {} exceeded {} bytes while streaming",
                    url,
                    self.max_body_bytes
                );
                return Err(self.too_large(url));
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(
            "Fetched {} -> {} (status {}, {} bytes)",
            url,
            final_url,
            status_code,
            body.len()
        );

        Ok(FetchedPage {
            url: url.to_string(),
            final_url,
            status_code,
            headers,
            content_type,
            body,
        })
    }

    fn too_large(&self, url: &str) -> FetchError {
        FetchError::TooLarge {
            url: url.to_string(),
            limit: self.max_body_bytes,
        }
    }
}

/// Maps a client error onto the fetch error taxonomy
fn classify_error(url: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

/// Flattens a header map into lowercase name -> value
///
/// Repeated headers are joined with ", ". Values that are not valid
/// visible ASCII are decoded lossily.
fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();

    for (name, value) in headers {
        let value = match value.to_str() {
            Ok(v) => v.to_string(),
            Err(_) => String::from_utf8_lossy(value.as_bytes()).into_owned(),
        };

        collected
            .entry(name.as_str().to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    collected
}
