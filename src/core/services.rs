//! Business logic services
//!
//! This module implements the application-layer services that sit between the
//! HTTP handlers and the credential store.

use crate::auth::password::verify_password;
use crate::core::error::{BackendError, Result};
use crate::db::models::{Captain, NewCaptain};
use crate::db::repository::CaptainStore;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Login failure for an email with no captain behind it
pub const UNKNOWN_EMAIL_MESSAGE: &str = "Captain with this email does not exists";
/// Login failure for a wrong password
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Captain service for registration and credential checks
pub struct CaptainService {
    store: Arc<dyn CaptainStore>,
    uniform_login_errors: bool,
}

impl CaptainService {
    /// Create a new CaptainService
    pub fn new(store: Arc<dyn CaptainStore>, uniform_login_errors: bool) -> Self {
        Self {
            store,
            uniform_login_errors,
        }
    }

    /// Persist a validated captain whose password has already been hashed
    pub async fn create_captain(&self, new: NewCaptain, password_hash: String) -> Result<Captain> {
        let captain = Captain {
            id: Uuid::new_v4().to_string(),
            fullname: new.fullname,
            email: new.email,
            password_hash,
            vehicle: new.vehicle,
            created_at: Utc::now().to_rfc3339(),
        };

        self.store.create(&captain).await
    }

    /// Whether a captain is already registered under `email`
    pub async fn email_taken(&self, email: &str) -> Result<bool> {
        Ok(self.store.find_by_email(email).await?.is_some())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Captain>> {
        self.store.find_by_id(id).await
    }

    /// Check an email/password pair and return the matching captain
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Captain> {
        let captain = match self.store.find_by_email(email).await? {
            Some(captain) => captain,
            None => {
                tracing::info!("Login attempt for unknown email");
                return Err(self.login_error(UNKNOWN_EMAIL_MESSAGE));
            }
        };

        if !verify_password(password, &captain.password_hash).await? {
            tracing::warn!(captain_id = %captain.id, "Invalid password");
            return Err(self.login_error(INVALID_CREDENTIALS_MESSAGE));
        }

        Ok(captain)
    }

    fn login_error(&self, message: &str) -> BackendError {
        if self.uniform_login_errors {
            BackendError::InvalidCredentials(INVALID_CREDENTIALS_MESSAGE.to_string())
        } else {
            BackendError::InvalidCredentials(message.to_string())
        }
    }
}
