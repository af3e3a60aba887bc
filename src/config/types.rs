use serde::Deserialize;

/// Main configuration structure for WebScraper
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraping: ScrapingConfig,
    pub database: DatabaseConfig,
}

/// Fetch and extraction limits
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapingConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Maximum number of links kept per page
    #[serde(rename = "max-links", default = "default_max_links")]
    pub max_links: usize,

    /// Maximum number of images kept per page
    #[serde(rename = "max-images", default = "default_max_images")]
    pub max_images: usize,

    /// Maximum response body size in bytes
    #[serde(rename = "max-body-bytes", default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
}

fn default_user_agent() -> String {
    format!("WebScraper/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> u64 {
    30
}

fn default_max_links() -> usize {
    100
}

fn default_max_images() -> usize {
    50
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout: default_timeout(),
            max_links: default_max_links(),
            max_images: default_max_images(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}
