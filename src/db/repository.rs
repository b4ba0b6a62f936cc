//! Repository pattern implementation for data access layer
//!
//! Handlers and services depend on the `CaptainStore` and `TokenBlacklist`
//! traits; the SQLite repositories below are the production implementations.

use crate::core::error::{BackendError, Result};
use crate::db::manager::DatabaseManager;
use crate::db::models::{Captain, Fullname, Vehicle};
use async_trait::async_trait;
use rusqlite::{ffi, OptionalExtension, Row};
use std::sync::Arc;

/// Message returned when an email is already registered
pub const DUPLICATE_EMAIL_MESSAGE: &str = "Captain with this email already exists";

/// Credential store for captain records
#[async_trait]
pub trait CaptainStore: Send + Sync {
    /// Exact-match lookup by email
    async fn find_by_email(&self, email: &str) -> Result<Option<Captain>>;

    /// Lookup by captain id
    async fn find_by_id(&self, id: &str) -> Result<Option<Captain>>;

    /// Insert a new captain, failing with `DuplicateResource` if the email is taken
    async fn create(&self, captain: &Captain) -> Result<Captain>;
}

/// Set of tokens that must no longer be honored
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Add a token; adding the same token twice is a no-op
    async fn add(&self, token: &str, expires_at: i64) -> Result<()>;

    /// Membership test
    async fn contains(&self, token: &str) -> Result<bool>;

    /// Remove entries whose `expires_at` is at or before `now`, returning how many were removed
    async fn prune_expired(&self, now: i64) -> Result<usize>;
}

const CAPTAIN_COLUMNS: &str = "id, firstname, lastname, email, password_hash, vehicle_color, \
     vehicle_plate, vehicle_capacity, vehicle_type, created_at";

fn captain_from_row(row: &Row<'_>) -> rusqlite::Result<Captain> {
    Ok(Captain {
        id: row.get(0)?,
        fullname: Fullname {
            firstname: row.get(1)?,
            lastname: row.get(2)?,
        },
        email: row.get(3)?,
        password_hash: row.get(4)?,
        vehicle: Vehicle {
            color: row.get(5)?,
            plate: row.get(6)?,
            capacity: row.get(7)?,
            vehicle_type: row.get(8)?,
        },
        created_at: row.get(9)?,
    })
}

/// A UNIQUE index rejected the row; CHECK and primary-key failures do not match
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Repository for Captain entities
pub struct CaptainRepository {
    db: Arc<DatabaseManager>,
}

impl CaptainRepository {
    /// Create a new CaptainRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Count captains registered with the given email
    #[cfg(test)]
    pub async fn count_by_email(&self, email: &str) -> Result<i64> {
        let email = email.to_string();
        self.db
            .execute(move |conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM captains WHERE email = ?",
                    [&email],
                    |row| row.get(0),
                )?)
            })
            .await
    }

    /// Count all captains
    #[cfg(test)]
    pub async fn count(&self) -> Result<i64> {
        self.db
            .execute(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM captains", [], |row| row.get(0))?))
            .await
    }
}

#[async_trait]
impl CaptainStore for CaptainRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Captain>> {
        let email = email.to_string();
        self.db
            .execute(move |conn| {
                Ok(conn
                    .query_row(
                        &format!("SELECT {} FROM captains WHERE email = ?", CAPTAIN_COLUMNS),
                        [&email],
                        captain_from_row,
                    )
                    .optional()?)
            })
            .await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Captain>> {
        let id = id.to_string();
        self.db
            .execute(move |conn| {
                Ok(conn
                    .query_row(
                        &format!("SELECT {} FROM captains WHERE id = ?", CAPTAIN_COLUMNS),
                        [&id],
                        captain_from_row,
                    )
                    .optional()?)
            })
            .await
    }

    async fn create(&self, captain: &Captain) -> Result<Captain> {
        let captain = captain.clone();
        self.db
            .execute(move |conn| {
                let inserted = conn.execute(
                    &format!(
                        "INSERT INTO captains ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                        CAPTAIN_COLUMNS
                    ),
                    rusqlite::params![
                        &captain.id,
                        &captain.fullname.firstname,
                        &captain.fullname.lastname,
                        &captain.email,
                        &captain.password_hash,
                        &captain.vehicle.color,
                        &captain.vehicle.plate,
                        captain.vehicle.capacity,
                        captain.vehicle.vehicle_type,
                        &captain.created_at,
                    ],
                );

                match inserted {
                    Ok(_) => Ok(captain),
                    Err(e) if is_unique_violation(&e) => {
                        Err(BackendError::DuplicateResource(DUPLICATE_EMAIL_MESSAGE.to_string()))
                    }
                    Err(e) => Err(e.into()),
                }
            })
            .await
    }
}

/// Repository for blacklisted tokens
pub struct BlacklistRepository {
    db: Arc<DatabaseManager>,
}

impl BlacklistRepository {
    /// Create a new BlacklistRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Fetch the stored entry for a token
    #[cfg(test)]
    pub async fn find(&self, token: &str) -> Result<Option<crate::db::models::BlacklistedToken>> {
        let token = token.to_string();
        self.db
            .execute(move |conn| {
                Ok(conn
                    .query_row(
                        "SELECT token, created_at, expires_at FROM blacklisted_tokens WHERE token = ?",
                        [&token],
                        |row| {
                            Ok(crate::db::models::BlacklistedToken {
                                token: row.get(0)?,
                                created_at: row.get(1)?,
                                expires_at: row.get(2)?,
                            })
                        },
                    )
                    .optional()?)
            })
            .await
    }

    /// Number of blacklisted tokens currently stored
    #[cfg(test)]
    pub async fn count(&self) -> Result<i64> {
        self.db
            .execute(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM blacklisted_tokens", [], |row| row.get(0))?)
            })
            .await
    }
}

#[async_trait]
impl TokenBlacklist for BlacklistRepository {
    async fn add(&self, token: &str, expires_at: i64) -> Result<()> {
        let token = token.to_string();
        let created_at = chrono::Utc::now().to_rfc3339();
        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT OR IGNORE INTO blacklisted_tokens (token, created_at, expires_at) \
                     VALUES (?, ?, ?)",
                    rusqlite::params![&token, &created_at, expires_at],
                )?;
                Ok(())
            })
            .await
    }

    async fn contains(&self, token: &str) -> Result<bool> {
        let token = token.to_string();
        self.db
            .execute(move |conn| {
                Ok(conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM blacklisted_tokens WHERE token = ?)",
                    [&token],
                    |row| row.get(0),
                )?)
            })
            .await
    }

    async fn prune_expired(&self, now: i64) -> Result<usize> {
        self.db
            .execute(move |conn| {
                Ok(conn.execute("DELETE FROM blacklisted_tokens WHERE expires_at <= ?", [now])?)
            })
            .await
    }
}
