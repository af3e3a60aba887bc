//! Scrape pipeline - per-request orchestration
//!
//! One call to [`Pipeline::scrape`] validates the URL, performs exactly one
//! fetch, extracts metadata from the body and persists the assembled result.
//! Any failure stops the request and nothing is written.

use crate::config::ScrapingConfig;
use crate::record::{NewResult, ResultRecord};
use crate::scrape::extractor::{extract, ExtractLimits, PageMetadata};
use crate::scrape::fetcher::{FetchedPage, Fetcher};
use crate::state::ScrapeStage;
use crate::storage::ResultRepository;
use crate::url::validate_url;
use crate::{FetchError, ScrapeError};
use std::sync::Arc;
use std::time::Instant;

/// Coordinates fetch, extraction and persistence for single pages
///
/// The pipeline holds no per-request state, so one instance can serve any
/// number of concurrent scrapes.
pub struct Pipeline<R: ResultRepository + ?Sized> {
    fetcher: Fetcher,
    limits: ExtractLimits,
    repository: Arc<R>,
}

impl<R: ResultRepository + ?Sized> Pipeline<R> {
    /// Creates a pipeline from the scraping configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Pipeline)` - Ready to scrape
    /// * `Err(FetchError::Client)` - The HTTP client could not be built
    pub fn new(config: &ScrapingConfig, repository: Arc<R>) -> Result<Self, FetchError> {
        Ok(Self::with_fetcher(
            Fetcher::new(config)?,
            ExtractLimits::from(config),
            repository,
        ))
    }

    /// Creates a pipeline around an existing fetcher
    pub fn with_fetcher(fetcher: Fetcher, limits: ExtractLimits, repository: Arc<R>) -> Self {
        Self {
            fetcher,
            limits,
            repository,
        }
    }

    /// Returns the repository results are written to
    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Scrapes one page and persists the result
    ///
    /// # Flow
    ///
    /// 1. Validate the URL (no request is made if this fails)
    /// 2. Fetch once; `load_time_ms` covers only this step
    /// 3. Extract metadata relative to the post-redirect URL
    /// 4. Save and return the stored record
    ///
    /// Non-2xx responses are not failures: they are extracted and stored
    /// like any other page.
    ///
    /// # Errors
    ///
    /// | Stage | Error |
    /// |-------|-------|
    /// | Validation | `ScrapeError::Validation` |
    /// | Fetch | `ScrapeError::Fetch` |
    /// | Extraction | `ScrapeError::Extract` |
    /// | Persistence | `ScrapeError::Persist` |
    pub async fn scrape(&self, url: &str) -> Result<ResultRecord, ScrapeError> {
        let mut stage = validated(url)?;

        advance(&mut stage, ScrapeStage::Fetching, url);
        let started = Instant::now();
        let page = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|e| fail(&mut stage, url, e))?;
        let load_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        advance(&mut stage, ScrapeStage::Extracting, url);
        let metadata = extract(&page, self.limits).map_err(|e| fail(&mut stage, url, e))?;

        advance(&mut stage, ScrapeStage::Persisting, url);
        let result = assemble(page, metadata, load_time_ms);
        let record = self
            .repository
            .save(&result)
            .map_err(|e| fail(&mut stage, url, ScrapeError::Persist(e)))?;

        advance(&mut stage, ScrapeStage::Done, url);
        tracing::info!(
            "Scraped {} as result {} (status {}, {} words, {} links, {} images, {} ms)",
            url,
            record.id,
            record.status_code,
            record.word_count,
            record.links.len(),
            record.images.len(),
            record.load_time_ms
        );

        Ok(record)
    }
}

/// Validates the URL; the scrape only enters its first stage on success
fn validated(url: &str) -> Result<ScrapeStage, ScrapeError> {
    match validate_url(url) {
        Ok(_) => {
            tracing::debug!("{}: {}", url, ScrapeStage::Validated);
            Ok(ScrapeStage::Validated)
        }
        Err(e) => {
            tracing::warn!("Scrape of {:?} failed while validating: {}", url, e);
            Err(e.into())
        }
    }
}

fn advance(stage: &mut ScrapeStage, to: ScrapeStage, url: &str) {
    debug_assert!(stage.can_transition_to(to), "{} -> {}", stage, to);
    tracing::debug!("{}: {} -> {}", url, stage, to);
    *stage = to;
}

fn fail<E: Into<ScrapeError>>(stage: &mut ScrapeStage, url: &str, err: E) -> ScrapeError {
    let err = err.into();
    tracing::warn!("Scrape of {} failed while {}: {}", url, stage, err);
    *stage = ScrapeStage::Failed;
    err
}

/// Combines fetch output and extracted metadata into a storable result
fn assemble(page: FetchedPage, metadata: PageMetadata, load_time_ms: u64) -> NewResult {
    NewResult {
        url: page.url,
        title: metadata.title,
        description: metadata.description,
        keywords: metadata.keywords,
        author: metadata.author,
        language: metadata.language,
        favicon: metadata.favicon,
        image_url: metadata.image_url,
        site_name: metadata.site_name,
        links: metadata.links,
        images: metadata.images,
        headers: page.headers,
        status_code: page.status_code,
        content_type: page.content_type,
        word_count: metadata.word_count,
        load_time_ms,
    }
}
