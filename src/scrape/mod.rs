//! Scrape module for single-page fetching and extraction
//!
//! This module contains the per-request scraping logic, including:
//! - HTTP fetching with a bounded body
//! - HTML metadata extraction
//! - Pipeline orchestration up to persistence

mod extractor;
mod fetcher;
mod pipeline;

pub use extractor::{extract, parse_html, ExtractLimits, PageMetadata};
pub use fetcher::{build_http_client, FetchedPage, Fetcher};
pub use pipeline::Pipeline;
