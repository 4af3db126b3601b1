//! SQLite-based cache implementation.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use finstate_core::{FetchRequest, FinstateError, ProbeCache, RawRow, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, instrument};

/// SQLite-based probe cache.
///
/// Stores each probe's raw rows as JSON, keyed by identifier, fiscal year,
/// report period and consolidation scope. Persists across runs.
///
/// Timestamps are fixed-width RFC 3339 so they compare correctly as text.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Create a new SQLite cache at the given path.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| FinstateError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory SQLite cache.
    ///
    /// Useful for testing; data is lost when the cache is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| FinstateError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| FinstateError::Cache(e.to_string()))
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS probe_cache (
                identifier TEXT NOT NULL,
                fiscal_year INTEGER NOT NULL,
                report_period TEXT NOT NULL,
                consolidation TEXT NOT NULL,
                rows_json TEXT NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (identifier, fiscal_year, report_period, consolidation)
            )",
            [],
        )
        .map_err(|e| FinstateError::Cache(e.to_string()))?;

        debug!("SQLite cache schema initialized");
        Ok(())
    }
}

#[async_trait]
impl ProbeCache for SqliteCache {
    #[instrument(skip(self), fields(request = %request))]
    async fn get(&self, request: &FetchRequest) -> Result<Option<Vec<RawRow>>> {
        let conn = self.lock()?;

        let result = conn
            .query_row(
                "SELECT rows_json FROM probe_cache
                 WHERE identifier = ?1 AND fiscal_year = ?2
                   AND report_period = ?3 AND consolidation = ?4",
                params![
                    request.identifier,
                    request.fiscal_year,
                    request.report_period.as_str(),
                    request.consolidation.as_str()
                ],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| FinstateError::Cache(e.to_string()))?;

        match result {
            Some(json) => {
                let rows: Vec<RawRow> =
                    serde_json::from_str(&json).map_err(|e| FinstateError::Parse(e.to_string()))?;
                debug!("Found {} cached probe rows", rows.len());
                Ok(Some(rows))
            }
            None => {
                debug!("No cached probe found");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, rows), fields(request = %request, count = rows.len()))]
    async fn put(&self, request: &FetchRequest, rows: &[RawRow]) -> Result<()> {
        let cached_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let rows_json = serde_json::to_string(rows).map_err(|e| FinstateError::Parse(e.to_string()))?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO probe_cache
             (identifier, fiscal_year, report_period, consolidation, rows_json, cached_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                request.identifier,
                request.fiscal_year,
                request.report_period.as_str(),
                request.consolidation.as_str(),
                rows_json,
                cached_at
            ],
        )
        .map_err(|e| FinstateError::Cache(e.to_string()))?;

        debug!("Cached {} probe rows", rows.len());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(ttl)
                .map_err(|e| FinstateError::Cache(format!("Invalid TTL duration: {e}")))?;
        let cutoff_str = cutoff.to_rfc3339_opts(SecondsFormat::Micros, true);

        let conn = self.lock()?;
        let deleted = conn
            .execute(
                "DELETE FROM probe_cache WHERE cached_at < ?1",
                params![cutoff_str],
            )
            .map_err(|e| FinstateError::Cache(e.to_string()))?;

        if deleted > 0 {
            debug!("Invalidated {} stale cache entries", deleted);
        }

        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM probe_cache", [])
            .map_err(|e| FinstateError::Cache(e.to_string()))?;

        debug!("Cleared all cache entries");
        Ok(())
    }
}
