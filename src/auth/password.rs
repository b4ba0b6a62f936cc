//! Password hashing and verification using bcrypt
//!
//! bcrypt is deliberately slow, so both operations run on the blocking pool.

use crate::core::error::{BackendError, Result};
use tokio::task;

/// Hash a password using bcrypt with the given cost
pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_string();
    task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| BackendError::TaskError(format!("Hashing task panicked: {}", e)))?
        .map_err(|e| BackendError::HashingError(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a hash
pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| BackendError::TaskError(format!("Verification task panicked: {}", e)))?
        .map_err(|e| BackendError::HashingError(format!("Failed to verify password: {}", e)))
}
