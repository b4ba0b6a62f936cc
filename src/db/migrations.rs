//! Database migrations
//!
//! Versioned schema migrations, each applied in its own transaction and
//! recorded in `schema_migrations`.

use crate::core::error::Result;
use rusqlite::Connection;
use tracing::{info, warn};

/// Migration version tracking table
const MIGRATION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at DATETIME DEFAULT CURRENT_TIMESTAMP
)
"#;

/// Captain records (version 1)
const MIGRATION_V1: &str = r#"
CREATE TABLE IF NOT EXISTS captains (
    id TEXT PRIMARY KEY,
    firstname TEXT NOT NULL,
    lastname TEXT,
    email TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    vehicle_color TEXT NOT NULL,
    vehicle_plate TEXT NOT NULL,
    vehicle_capacity INTEGER NOT NULL CHECK (vehicle_capacity >= 1),
    vehicle_type TEXT NOT NULL CHECK (vehicle_type IN ('car', 'bike', 'truck', 'van')),
    created_at TEXT NOT NULL
);
"#;

/// Token blacklist (version 2)
const MIGRATION_V2: &str = r#"
CREATE TABLE IF NOT EXISTS blacklisted_tokens (
    token TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    expires_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_blacklisted_tokens_expires_at
    ON blacklisted_tokens(expires_at);
"#;

/// All migrations in application order
const MIGRATIONS: &[(i64, &str)] = &[(1, MIGRATION_V1), (2, MIGRATION_V2)];

/// Run all pending migrations
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(MIGRATION_TABLE)?;

    let current_version = current_version(conn)?;
    info!(current_version, "Checking database schema version");

    for &(version, sql) in MIGRATIONS {
        if version > current_version {
            apply_migration(conn, version, sql)?;
        }
    }

    Ok(())
}

/// Highest applied migration version, 0 for a fresh database
pub fn current_version(conn: &Connection) -> Result<i64> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Apply a single migration
fn apply_migration(conn: &mut Connection, version: i64, sql: &str) -> Result<()> {
    let tx = conn.transaction()?;

    tx.execute_batch(sql).map_err(|e| {
        warn!("Migration v{} failed: {}", version, e);
        e
    })?;

    tx.execute("INSERT INTO schema_migrations (version) VALUES (?)", [version])?;
    tx.commit()?;

    info!("Migration v{} applied successfully", version);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_apply_and_are_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();

        run_migrations(&mut conn).unwrap();
        assert_eq!(current_version(&conn).unwrap(), 2);

        run_migrations(&mut conn).unwrap();
        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(applied, 2);
    }

    #[test]
    fn test_captain_email_is_unique() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();

        let insert = "INSERT INTO captains (id, firstname, email, password_hash, vehicle_color, \
                      vehicle_plate, vehicle_capacity, vehicle_type, created_at) \
                      VALUES (?, 'A', 'a@b.com', 'h', 'red', 'XY1', 4, 'car', '2024-01-01T00:00:00Z')";

        conn.execute(insert, ["one"]).unwrap();
        assert!(conn.execute(insert, ["two"]).is_err());
    }
}
