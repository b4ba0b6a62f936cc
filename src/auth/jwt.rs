//! JWT token generation and validation

use crate::core::error::{BackendError, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Captain id
    #[serde(rename = "_id")]
    pub captain_id: String,
    /// Unique token id, keeps tokens issued within the same second distinct
    pub jti: String,
    pub iat: usize,
    pub exp: usize,
}

/// Generate a signed token for a captain, valid for `ttl_secs` seconds
pub fn generate_token(captain_id: &str, secret: &str, ttl_secs: u64) -> Result<String> {
    let now = chrono::Utc::now();
    let ttl = i64::try_from(ttl_secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .ok_or_else(|| BackendError::TokenError("Token lifetime out of range".to_string()))?;
    let expiration = now
        .checked_add_signed(ttl)
        .ok_or_else(|| BackendError::TokenError("Failed to calculate expiration".to_string()))?;

    let claims = Claims {
        captain_id: captain_id.to_string(),
        jti: Uuid::new_v4().to_string(),
        iat: now.timestamp() as usize,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| BackendError::TokenError(format!("Failed to generate token: {}", e)))
}

/// Validate a token's signature and expiry and extract its claims
///
/// Expiry has no leeway; blacklist entries are pruned as soon as `exp` passes.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| BackendError::AuthenticationError(format!("Invalid token: {}", e)))?;

    Ok(token_data.claims)
}
