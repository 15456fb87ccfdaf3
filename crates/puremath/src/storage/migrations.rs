//! Database migration system for puremath.
//!
//! This module handles database schema versioning and migrations,
//! ensuring the database schema stays up-to-date as the application evolves.

use rusqlite::Connection;

use crate::error::{Error, Result};

use super::schema::SCHEMA_STATEMENTS;

/// The current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// Initialize the database schema.
///
/// Creates all tables and indexes if they don't exist, then runs any
/// pending migrations to bring the schema up to the current version.
///
/// # Errors
///
/// Returns an error if schema creation or migration fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    let version = get_schema_version(conn)?;
    if version < CURRENT_VERSION {
        run_migrations(conn, version)?;
    }

    Ok(())
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (fresh database).
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let result: std::result::Result<String, rusqlite::Error> = conn.query_row(
        "SELECT value FROM metadata WHERE key = ?1",
        [VERSION_KEY],
        |row| row.get(0),
    );

    match result {
        Ok(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e.into()),
    }
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}

/// Run migrations from the given version to the current version.
fn run_migrations(conn: &Connection, from_version: i32) -> Result<()> {
    let mut current = from_version;

    while current < CURRENT_VERSION {
        current += 1;
        match current {
            // Version 1 is the base schema, already created by
            // SCHEMA_STATEMENTS; nothing to rewrite.
            1 => {}
            _ => {
                return Err(Error::DatabaseMigration {
                    message: format!("unknown migration version: {current}"),
                })
            }
        }
    }

    set_schema_version(conn, CURRENT_VERSION)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_db() -> Connection {
        Connection::open_in_memory().expect("failed to create in-memory database")
    }

    fn table_exists(conn: &Connection, name: &str) -> bool {
        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [name],
                |row| row.get(0),
            )
            .unwrap();
        count == 1
    }

    #[test]
    fn test_initialize_schema_creates_tables() {
        let conn = create_test_db();
        initialize_schema(&conn).expect("failed to initialize schema");

        assert!(table_exists(&conn, "solutions"));
        assert!(table_exists(&conn, "history"));
        assert!(table_exists(&conn, "metadata"));
    }

    #[test]
    fn test_initialize_schema_sets_version() {
        let conn = create_test_db();
        initialize_schema(&conn).expect("failed to initialize schema");

        let version = get_schema_version(&conn).unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_initialize_schema_idempotent() {
        let conn = create_test_db();

        initialize_schema(&conn).expect("first init failed");
        initialize_schema(&conn).expect("second init failed");

        let version = get_schema_version(&conn).unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_get_schema_version_fresh_db() {
        let conn = create_test_db();
        conn.execute(
            "CREATE TABLE metadata (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )
        .unwrap();

        let version = get_schema_version(&conn).unwrap();
        assert_eq!(version, 0);
    }

    #[test]
    fn test_set_and_get_schema_version() {
        let conn = create_test_db();
        conn.execute(
            "CREATE TABLE metadata (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )
        .unwrap();

        set_schema_version(&conn, 42).unwrap();
        let version = get_schema_version(&conn).unwrap();
        assert_eq!(version, 42);
    }

    #[test]
    fn test_run_migrations_rejects_unknown_version() {
        let conn = create_test_db();
        initialize_schema(&conn).unwrap();

        // Version -1 forces the loop through version 0, which no
        // migration handles.
        let result = run_migrations(&conn, -1);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_version_string_is_rejected() {
        let conn = create_test_db();
        conn.execute(
            "CREATE TABLE metadata (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO metadata (key, value) VALUES ('schema_version', 'not-a-number')",
            [],
        )
        .unwrap();

        let result = get_schema_version(&conn);
        assert!(matches!(result, Err(Error::DatabaseMigration { .. })));
    }

    #[test]
    fn test_indexes_created() {
        let conn = create_test_db();
        initialize_schema(&conn).expect("failed to initialize schema");

        let indexes: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(std::result::Result::ok)
            .collect();

        assert!(indexes.iter().any(|n| n.contains("solutions_hash")));
        assert!(indexes.iter().any(|n| n.contains("solutions_created")));
        assert!(indexes.iter().any(|n| n.contains("history_timestamp")));
        assert!(indexes.iter().any(|n| n.contains("history_category")));
    }
}
