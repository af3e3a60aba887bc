//! WebScraper: single-page metadata scraper
//!
//! This crate fetches one web page on demand, extracts structured metadata
//! from its HTML (title, description, links, images, word count, ...),
//! persists the result in SQLite and exposes the stored results through a
//! small repository API.

pub mod config;
pub mod output;
pub mod record;
pub mod scrape;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Errors raised while issuing the single outbound request for a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Response body from {url} exceeds {limit} bytes")]
    TooLarge { url: String, limit: usize },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Errors raised while turning a fetched body into metadata
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Body of {url} is not decodable as text: {reason}")]
    Unparseable { url: String, reason: String },
}

/// Errors raised by caller-side URL validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("URL is required")]
    Empty,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Error returned by [`scrape::Pipeline::scrape`]
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("Failed to persist result: {0}")]
    Persist(#[source] storage::StorageError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL validation
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

// Re-export commonly used types
pub use config::Config;
pub use record::{NewResult, ResultRecord};
pub use scrape::Pipeline;
pub use state::ScrapeStage;
pub use storage::{ResultRepository, SqliteRepository, StorageError};
pub use url::validate_url;
