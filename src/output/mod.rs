//! Output module for presenting stored results
//!
//! This module handles:
//! - Rendering records as human-readable text or JSON
//! - Summarizing the result store

pub mod stats;

pub use stats::{load_statistics, print_statistics, ResultStatistics};

use crate::record::ResultRecord;
use std::fmt;

/// How records are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Renders one record in full
pub fn render_record(record: &ResultRecord, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(record),
        OutputFormat::Text => Ok(record_text(record)),
    }
}

/// Renders a list of records
///
/// Text output is one summary line per record; JSON output is an array of
/// full records.
pub fn render_records(records: &[ResultRecord], format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(records),
        OutputFormat::Text if records.is_empty() => Ok("No results".to_string()),
        OutputFormat::Text => Ok(records
            .iter()
            .map(summary_line)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// One line per record: id, status, timestamp, url and title
fn summary_line(record: &ResultRecord) -> String {
    format!(
        "{:>6}  {}  {}  {}  {}",
        record.id,
        record.status_code,
        record.created_at.format("%Y-%m-%d %H:%M:%S"),
        record.url,
        record.title.as_deref().unwrap_or("-")
    )
}

fn record_text(record: &ResultRecord) -> String {
    RecordText(record).to_string().trim_end().to_string()
}

/// Multi-line text report for one record
struct RecordText<'a>(&'a ResultRecord);

impl fmt::Display for RecordText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.0;

        writeln!(f, "=== Result {} ===\n", record.id)?;
        writeln!(f, "URL: {}", record.url)?;
        writeln!(f, "Status: {}", record.status_code)?;
        writeln!(f, "Content-Type: {}", or_dash(Some(&record.content_type)))?;
        writeln!(f, "Scraped at: {}", record.created_at.to_rfc3339())?;
        writeln!(f, "Load time: {}ms", record.load_time_ms)?;
        writeln!(f, "Word count: {}\n", record.word_count)?;

        writeln!(f, "Metadata:")?;
        for (label, value) in [
            ("Title", &record.title),
            ("Description", &record.description),
            ("Keywords", &record.keywords),
            ("Author", &record.author),
            ("Language", &record.language),
            ("Site name", &record.site_name),
            ("Favicon", &record.favicon),
            ("Image", &record.image_url),
        ] {
            writeln!(f, "  {}: {}", label, or_dash(value.as_ref()))?;
        }

        write_list(f, "Links", &record.links)?;
        write_list(f, "Images", &record.images)?;

        if !record.headers.is_empty() {
            writeln!(f, "\nHeaders ({}):", record.headers.len())?;
            for (name, value) in &record.headers {
                writeln!(f, "  {}: {}", name, value)?;
            }
        }

        Ok(())
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, label: &str, items: &[String]) -> fmt::Result {
    writeln!(f, "\n{} ({}):", label, items.len())?;
    for item in items {
        writeln!(f, "  - {}", item)?;
    }
    Ok(())
}

fn or_dash(value: Option<&String>) -> &str {
    value.map(String::as_str).filter(|s| !s.is_empty()).unwrap_or("-")
}
