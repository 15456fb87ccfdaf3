//! `SQLite` schema definitions for puremath.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the solution cache table.
///
/// One row per distinct normalized statement; `transcript` holds the
/// full solution as JSON.
pub const CREATE_SOLUTIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS solutions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    statement_hash TEXT NOT NULL UNIQUE,
    statement TEXT NOT NULL,
    category TEXT NOT NULL,
    answer TEXT NOT NULL,
    transcript TEXT NOT NULL,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create an index on `statement_hash` for cache lookups.
pub const CREATE_SOLUTIONS_HASH_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_solutions_hash ON solutions(statement_hash)
";

/// SQL statement to create an index on `created_at` for expiry pruning.
pub const CREATE_SOLUTIONS_CREATED_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_solutions_created ON solutions(created_at DESC)
";

/// SQL statement to create the interaction history table.
pub const CREATE_HISTORY_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    statement TEXT NOT NULL,
    category TEXT NOT NULL,
    answer_preview TEXT NOT NULL,
    answer_len INTEGER NOT NULL,
    duration_ms INTEGER NOT NULL,
    cache_hit INTEGER NOT NULL DEFAULT 0
)
";

/// SQL statement to create an index on history timestamps.
pub const CREATE_HISTORY_TIMESTAMP_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_history_timestamp ON history(timestamp DESC)
";

/// SQL statement to create an index on history categories for filtering.
pub const CREATE_HISTORY_CATEGORY_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_history_category ON history(category)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_SOLUTIONS_TABLE,
    CREATE_SOLUTIONS_HASH_INDEX,
    CREATE_SOLUTIONS_CREATED_INDEX,
    CREATE_HISTORY_TABLE,
    CREATE_HISTORY_TIMESTAMP_INDEX,
    CREATE_HISTORY_CATEGORY_INDEX,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_solutions_table_contains_required_columns() {
        assert!(CREATE_SOLUTIONS_TABLE.contains("statement_hash TEXT NOT NULL UNIQUE"));
        assert!(CREATE_SOLUTIONS_TABLE.contains("answer TEXT NOT NULL"));
        assert!(CREATE_SOLUTIONS_TABLE.contains("transcript TEXT NOT NULL"));
        assert!(CREATE_SOLUTIONS_TABLE.contains("created_at TEXT NOT NULL"));
    }

    #[test]
    fn test_history_table_contains_required_columns() {
        assert!(CREATE_HISTORY_TABLE.contains("answer_preview TEXT NOT NULL"));
        assert!(CREATE_HISTORY_TABLE.contains("duration_ms INTEGER NOT NULL"));
        assert!(CREATE_HISTORY_TABLE.contains("cache_hit INTEGER NOT NULL"));
    }

    #[test]
    fn test_create_metadata_table_structure() {
        assert!(CREATE_METADATA_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_METADATA_TABLE.contains("value TEXT NOT NULL"));
    }
}
