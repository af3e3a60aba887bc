//! Database schema definitions
//!
//! This module contains the SQL schema for the WebScraper result store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per successful scrape
CREATE TABLE IF NOT EXISTS scraping_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    title TEXT,
    description TEXT,
    keywords TEXT,
    author TEXT,
    language TEXT,
    favicon TEXT,
    image_url TEXT,
    site_name TEXT,
    links TEXT,
    images TEXT,
    headers TEXT,
    status_code INTEGER NOT NULL,
    content_type TEXT NOT NULL DEFAULT '',
    word_count INTEGER NOT NULL DEFAULT 0 CHECK (word_count >= 0),
    load_time_ms INTEGER NOT NULL DEFAULT 0 CHECK (load_time_ms >= 0),
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_scraping_results_url ON scraping_results(url);
CREATE INDEX IF NOT EXISTS idx_scraping_results_created_at ON scraping_results(created_at);
CREATE INDEX IF NOT EXISTS idx_scraping_results_status_code ON scraping_results(status_code);
"#;

/// Column list shared by every SELECT, in `row_to_record` order
pub const RESULT_COLUMNS: &str = "id, url, title, description, keywords, author, language, \
     favicon, image_url, site_name, links, images, headers, status_code, content_type, \
     word_count, load_time_ms, created_at";

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
