//! State module for tracking scrape progress
//!
//! - `ScrapeStage`: the stage a single scrape request is in
//!   (validated, fetching, extracting, persisting, done, failed)

mod scrape_stage;

pub use scrape_stage::ScrapeStage;
