//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the
//! `ResultRepository` trait.

use crate::record::{NewResult, ResultRecord};
use crate::storage::codec::{decode_headers, decode_list, encode_headers, encode_list};
use crate::storage::schema::{initialize_schema, RESULT_COLUMNS};
use crate::storage::traits::{ResultRepository, StorageError, StorageResult};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Params, Row};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite result repository
///
/// Owns the single database connection for the lifetime of the process.
/// The connection sits behind a mutex so concurrent scrapes can share one
/// repository; every write happens inside that critical section.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Opens (or creates) the database at `path` and initializes the schema
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteRepository)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        initialize_schema(&conn)?;

        tracing::debug!("Opened result store at {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Closes the connection, surfacing any error SQLite reports on close
    pub fn close(self) -> StorageResult<()> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|_| StorageError::Unavailable("connection lock poisoned".to_string()))?;
        conn.close().map_err(|(_, err)| StorageError::from(err))
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Unavailable("connection lock poisoned".to_string()))
    }

    fn query_records<P: Params>(&self, sql: &str, params: P) -> StorageResult<Vec<ResultRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;

        let rows = stmt
            .query_map(params, StoredRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(StoredRow::into_record).collect()
    }
}

impl ResultRepository for SqliteRepository {
    // ===== Writes =====

    fn save(&self, result: &NewResult) -> StorageResult<ResultRecord> {
        let created_at = Utc::now();
        let word_count = to_sql_int(result.word_count);
        let load_time_ms = to_sql_int(result.load_time_ms);

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO scraping_results
             (url, title, description, keywords, author, language, favicon, image_url,
              site_name, links, images, headers, status_code, content_type, word_count,
              load_time_ms, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                result.url,
                result.title,
                result.description,
                result.keywords,
                result.author,
                result.language,
                result.favicon,
                result.image_url,
                result.site_name,
                encode_list(&result.links),
                encode_list(&result.images),
                encode_headers(&result.headers),
                result.status_code,
                result.content_type,
                word_count,
                load_time_ms,
                created_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(ResultRecord::from_new(id, created_at, result.clone()))
    }

    fn delete_by_id(&self, id: i64) -> StorageResult<()> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM scraping_results WHERE id = ?1", params![id])?;

        if deleted == 0 {
            return Err(StorageError::NotFound(id));
        }
        Ok(())
    }

    // ===== Reads =====

    fn list(&self) -> StorageResult<Vec<ResultRecord>> {
        self.query_records(
            &format!(
                "SELECT {} FROM scraping_results ORDER BY id DESC",
                RESULT_COLUMNS
            ),
            params![],
        )
    }

    fn get_by_id(&self, id: i64) -> StorageResult<Option<ResultRecord>> {
        let row = {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM scraping_results WHERE id = ?1",
                RESULT_COLUMNS
            ))?;
            let row = stmt.query_row(params![id], StoredRow::from_row).optional()?;
            row
        };

        row.map(StoredRow::into_record).transpose()
    }

    fn list_by_url(&self, url: &str) -> StorageResult<Vec<ResultRecord>> {
        self.query_records(
            &format!(
                "SELECT {} FROM scraping_results WHERE url = ?1 ORDER BY id DESC",
                RESULT_COLUMNS
            ),
            params![url],
        )
    }

    fn list_by_status(&self, status_code: u16) -> StorageResult<Vec<ResultRecord>> {
        self.query_records(
            &format!(
                "SELECT {} FROM scraping_results WHERE status_code = ?1 ORDER BY id DESC",
                RESULT_COLUMNS
            ),
            params![status_code],
        )
    }

    // ===== Statistics =====

    fn count(&self) -> StorageResult<u64> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM scraping_results", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn status_breakdown(&self) -> StorageResult<BTreeMap<u16, u64>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT status_code, COUNT(*) FROM scraping_results GROUP BY status_code",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, u16>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut breakdown = BTreeMap::new();
        for row in rows {
            let (status, count) = row?;
            breakdown.insert(status, count as u64);
        }

        Ok(breakdown)
    }
}

/// A row as stored, before composite columns are decoded
struct StoredRow {
    id: i64,
    url: String,
    title: Option<String>,
    description: Option<String>,
    keywords: Option<String>,
    author: Option<String>,
    language: Option<String>,
    favicon: Option<String>,
    image_url: Option<String>,
    site_name: Option<String>,
    links: Option<String>,
    images: Option<String>,
    headers: Option<String>,
    status_code: u16,
    content_type: String,
    word_count: i64,
    load_time_ms: i64,
    created_at: String,
}

impl StoredRow {
    /// Reads columns in `RESULT_COLUMNS` order
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            url: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            keywords: row.get(4)?,
            author: row.get(5)?,
            language: row.get(6)?,
            favicon: row.get(7)?,
            image_url: row.get(8)?,
            site_name: row.get(9)?,
            links: row.get(10)?,
            images: row.get(11)?,
            headers: row.get(12)?,
            status_code: row.get(13)?,
            content_type: row.get(14)?,
            word_count: row.get(15)?,
            load_time_ms: row.get(16)?,
            created_at: row.get(17)?,
        })
    }

    fn into_record(self) -> StorageResult<ResultRecord> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StorageError::Codec {
                column: "created_at",
                message: e.to_string(),
            })?;

        Ok(ResultRecord {
            id: self.id,
            url: self.url,
            title: self.title,
            description: self.description,
            keywords: self.keywords,
            author: self.author,
            language: self.language,
            favicon: self.favicon,
            image_url: self.image_url,
            site_name: self.site_name,
            links: decode_list("links", self.links.as_deref())?,
            images: decode_list("images", self.images.as_deref())?,
            headers: decode_headers(self.headers.as_deref())?,
            status_code: self.status_code,
            content_type: self.content_type,
            word_count: from_sql_int("word_count", self.word_count)?,
            load_time_ms: from_sql_int("load_time_ms", self.load_time_ms)?,
            created_at,
        })
    }
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_sql_int(column: &'static str, value: i64) -> StorageResult<u64> {
    u64::try_from(value).map_err(|_| StorageError::Codec {
        column,
        message: format!("negative value {}", value),
    })
}
