//! Storage layer for puremath.
//!
//! This module provides `SQLite`-based persistent storage with two tables:
//! a solution cache keyed by statement hash, and an interaction history
//! log with search and pruning capabilities.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::problem::{Category, Problem, Solution, Step};

/// Storage engine for solved problems.
///
/// Provides persistent storage using `SQLite` with support for:
/// - Solution caching keyed by statement hash, with TTL expiry
/// - An append-only history log of answered questions
/// - Substring search and category filtering over the history
/// - Automatic pruning of old entries
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        // Initialize schema
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store a solved problem in the cache.
    ///
    /// Replaces any existing entry for the same statement hash, which
    /// refreshes its creation time.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database operation fails.
    pub fn cache_store(&self, problem: &Problem, solution: &Solution) -> Result<()> {
        let transcript = serde_json::to_string(&solution.steps)?;
        let created_at = Utc::now().to_rfc3339();

        self.conn.execute(
            r"
            INSERT OR REPLACE INTO solutions
                (statement_hash, statement, category, answer, transcript, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                problem.statement_hash,
                problem.statement,
                solution.category.to_string(),
                solution.answer,
                transcript,
                created_at,
            ],
        )?;

        debug!(
            "Cached solution for hash {}",
            &problem.statement_hash[..16]
        );
        Ok(())
    }

    /// Look up a cached solution by statement hash.
    ///
    /// When a TTL is given, an entry older than it is deleted and reported
    /// as a miss.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation or transcript decoding fails.
    pub fn cache_lookup(
        &self,
        hash: &str,
        ttl: Option<Duration>,
    ) -> Result<Option<CachedSolution>> {
        let row = self
            .conn
            .query_row(
                r"
                SELECT statement, category, answer, transcript, created_at
                FROM solutions WHERE statement_hash = ?1
                ",
                [hash],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((statement, category_str, answer, transcript, created_str)) = row else {
            return Ok(None);
        };

        let created_at = DateTime::parse_from_rfc3339(&created_str)
            .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

        if let Some(max_age) = ttl {
            if Utc::now() - created_at > max_age {
                self.conn
                    .execute("DELETE FROM solutions WHERE statement_hash = ?1", [hash])?;
                debug!("Evicted expired cache entry for {statement}");
                return Ok(None);
            }
        }

        let steps: Vec<Step> = serde_json::from_str(&transcript)?;
        let category = Category::parse(&category_str).unwrap_or_else(|| {
            warn!(
                "Unknown category in cache: {}, defaulting to arithmetic",
                category_str
            );
            Category::Arithmetic
        });

        Ok(Some(CachedSolution {
            statement,
            solution: Solution {
                answer,
                steps,
                category,
            },
            created_at,
        }))
    }

    /// Count cached solutions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn cache_count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM solutions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete all cached solutions.
    ///
    /// Returns the number of entries deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn cache_clear(&self) -> Result<usize> {
        let affected = self.conn.execute("DELETE FROM solutions", [])?;
        if affected > 0 {
            info!("Cleared {} cached solutions", affected);
        }
        Ok(affected)
    }

    /// Prune cached solutions older than the given duration.
    ///
    /// Returns the number of entries deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn cache_prune_expired(&self, max_age: Duration) -> Result<usize> {
        let cutoff = (Utc::now() - max_age).to_rfc3339();

        let affected = self
            .conn
            .execute("DELETE FROM solutions WHERE created_at < ?1", [cutoff])?;

        if affected > 0 {
            info!("Pruned {} expired cache entries", affected);
        }
        Ok(affected)
    }

    /// Record an answered question in the history log.
    ///
    /// Returns the assigned ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn history_record(&self, entry: &HistoryEntry) -> Result<i64> {
        let timestamp = entry.timestamp.to_rfc3339();
        let answer_len = i64::try_from(entry.answer_len).unwrap_or(i64::MAX);
        let duration_ms = i64::try_from(entry.duration_ms).unwrap_or(i64::MAX);

        self.conn.execute(
            r"
            INSERT INTO history
                (timestamp, statement, category, answer_preview, answer_len, duration_ms, cache_hit)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            params![
                timestamp,
                entry.statement,
                entry.category.to_string(),
                entry.answer_preview,
                answer_len,
                duration_ms,
                i32::from(entry.cache_hit),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Recorded history entry {}", id);
        Ok(id)
    }

    /// Get the most recent history entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn history_recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, timestamp, statement, category, answer_preview,
                   answer_len, duration_ms, cache_hit
            FROM history ORDER BY timestamp DESC, id DESC LIMIT ?1
            ",
        )?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let entries = stmt
            .query_map([limit_i64], Self::row_to_history)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Search history entries by question text.
    ///
    /// Performs a case-insensitive substring search.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn history_search(&self, query: &str, limit: usize) -> Result<Vec<HistoryEntry>> {
        let pattern = format!("%{query}%");
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, timestamp, statement, category, answer_preview,
                   answer_len, duration_ms, cache_hit
            FROM history WHERE statement LIKE ?1
            ORDER BY timestamp DESC, id DESC LIMIT ?2
            ",
        )?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let entries = stmt
            .query_map(params![pattern, limit_i64], Self::row_to_history)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Get history entries of a specific category.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn history_by_category(
        &self,
        category: Category,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>> {
        let category_str = category.to_string();
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, timestamp, statement, category, answer_preview,
                   answer_len, duration_ms, cache_hit
            FROM history WHERE category = ?1
            ORDER BY timestamp DESC, id DESC LIMIT ?2
            ",
        )?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let entries = stmt
            .query_map(params![category_str, limit_i64], Self::row_to_history)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Count total history entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn history_count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete all history entries.
    ///
    /// Returns the number of entries deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn history_clear(&self) -> Result<usize> {
        let affected = self.conn.execute("DELETE FROM history", [])?;
        if affected > 0 {
            info!("Cleared {} history entries", affected);
        }
        Ok(affected)
    }

    /// Prune history entries older than the given duration.
    ///
    /// Returns the number of entries deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn history_prune_older_than(&self, max_age: Duration) -> Result<usize> {
        let cutoff = (Utc::now() - max_age).to_rfc3339();

        let affected = self
            .conn
            .execute("DELETE FROM history WHERE timestamp < ?1", [cutoff])?;

        if affected > 0 {
            info!("Pruned {} old history entries", affected);
        }
        Ok(affected)
    }

    /// Prune history to keep only the most recent N entries.
    ///
    /// Returns the number of entries deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn history_prune_keep_recent(&self, keep_count: usize) -> Result<usize> {
        let keep_i64 = i64::try_from(keep_count).unwrap_or(i64::MAX);
        let affected = self.conn.execute(
            r"
            DELETE FROM history WHERE id NOT IN (
                SELECT id FROM history ORDER BY timestamp DESC, id DESC LIMIT ?1
            )
            ",
            [keep_i64],
        )?;

        if affected > 0 {
            info!(
                "Pruned {} history entries to keep {} recent",
                affected, keep_count
            );
        }
        Ok(affected)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let cached_solutions = self.cache_count()?;
        let history_entries = self.history_count()?;

        let oldest: Option<String> = self
            .conn
            .query_row(
                "SELECT timestamp FROM history ORDER BY timestamp ASC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let newest: Option<String> = self
            .conn
            .query_row(
                "SELECT timestamp FROM history ORDER BY timestamp DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let oldest_entry = oldest
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        let newest_entry = newest
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        // Get database file size
        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            cached_solutions,
            history_entries,
            oldest_entry,
            newest_entry,
            db_size_bytes,
        })
    }

    /// Convert a database row to a history entry.
    fn row_to_history(row: &rusqlite::Row) -> rusqlite::Result<HistoryEntry> {
        let id: i64 = row.get(0)?;
        let timestamp_str: String = row.get(1)?;
        let statement: String = row.get(2)?;
        let category_str: String = row.get(3)?;
        let answer_preview: String = row.get(4)?;
        let answer_len: i64 = row.get(5)?;
        let duration_ms: i64 = row.get(6)?;
        let cache_hit: bool = row.get(7)?;

        let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
            .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

        let category = Category::parse(&category_str).unwrap_or_else(|| {
            warn!(
                "Unknown category in history: {}, defaulting to arithmetic",
                category_str
            );
            Category::Arithmetic
        });

        Ok(HistoryEntry {
            id: Some(id),
            timestamp,
            statement,
            category,
            answer_preview,
            answer_len: usize::try_from(answer_len).unwrap_or(0),
            duration_ms: u64::try_from(duration_ms).unwrap_or(0),
            cache_hit,
        })
    }
}

/// A cached solution retrieved from the solutions table.
#[derive(Debug, Clone)]
pub struct CachedSolution {
    /// The normalized statement the solution answers.
    pub statement: String,
    /// The stored solution with its full step transcript.
    pub solution: Solution,
    /// When the entry was cached.
    pub created_at: DateTime<Utc>,
}

/// A single logged interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Database ID. `None` until the entry has been recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// When the question was asked.
    pub timestamp: DateTime<Utc>,
    /// The normalized question text.
    pub statement: String,
    /// Detected problem category.
    pub category: Category,
    /// Answer text, truncated for display.
    pub answer_preview: String,
    /// Length of the full answer in characters.
    pub answer_len: usize,
    /// Wall-clock solve time in milliseconds.
    pub duration_ms: u64,
    /// Whether the answer came from the cache.
    pub cache_hit: bool,
}

impl HistoryEntry {
    /// Create a new history entry, truncating the answer preview to
    /// `preview_chars` characters.
    #[must_use]
    pub fn new(
        statement: impl Into<String>,
        category: Category,
        answer: &str,
        duration_ms: u64,
        cache_hit: bool,
        preview_chars: usize,
    ) -> Self {
        let answer_len = answer.chars().count();
        let answer_preview = if answer_len > preview_chars {
            answer.chars().take(preview_chars).collect()
        } else {
            answer.to_string()
        };

        Self {
            id: None,
            timestamp: Utc::now(),
            statement: statement.into(),
            category,
            answer_preview,
            answer_len,
            duration_ms,
            cache_hit,
        }
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Number of cached solutions.
    pub cached_solutions: i64,
    /// Number of history entries.
    pub history_entries: i64,
    /// Timestamp of the oldest history entry.
    pub oldest_entry: Option<DateTime<Utc>>,
    /// Timestamp of the newest history entry.
    pub newest_entry: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
