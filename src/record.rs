//! Scrape result values
//!
//! `NewResult` is what the pipeline assembles from one fetch and one
//! extraction. `ResultRecord` is the same data after the store assigned an
//! id and a creation timestamp.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Fields of a scrape result that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NewResult {
    /// The URL as requested by the caller (not normalized)
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Raw comma-separated keywords text
    pub keywords: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    pub favicon: Option<String>,
    /// Social preview image
    pub image_url: Option<String>,
    pub site_name: Option<String>,
    pub links: Vec<String>,
    pub images: Vec<String>,
    /// Response headers keyed by lowercase name
    pub headers: BTreeMap<String, String>,
    pub status_code: u16,
    pub content_type: String,
    pub word_count: u64,
    pub load_time_ms: u64,
}

/// A persisted scrape result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    pub id: i64,
    pub url: String,
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
    pub headers: BTreeMap<String, String>,
    pub status_code: u16,
    pub content_type: String,
    pub word_count: u64,
    pub load_time_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl ResultRecord {
    /// Attaches store-assigned identity to a new result
    pub fn from_new(id: i64, created_at: DateTime<Utc>, result: NewResult) -> Self {
        Self {
            id,
            url: result.url,
            title: result.title,
            description: result.description,
            keywords: result.keywords,
            author: result.author,
            language: result.language,
            favicon: result.favicon,
            image_url: result.image_url,
            site_name: result.site_name,
            links: result.links,
            images: result.images,
            headers: result.headers,
            status_code: result.status_code,
            content_type: result.content_type,
            word_count: result.word_count,
            load_time_ms: result.load_time_ms,
            created_at,
        }
    }

    /// Returns true for 2xx status codes
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}
