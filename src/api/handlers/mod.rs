pub mod captains;
pub mod system;

pub use captains::*;
pub use system::*;

use crate::core::config::AuthConfig;
use crate::core::services::CaptainService;
use crate::db::manager::DatabaseManager;
use crate::db::repository::{BlacklistRepository, CaptainRepository, TokenBlacklist};
use std::sync::Arc;

/// Shared application state for handlers
#[derive(Clone)]
pub struct AppState {
    pub captain_service: Arc<CaptainService>,
    pub blacklist: Arc<dyn TokenBlacklist>,
    pub auth: Arc<AuthConfig>,
    pub db: Arc<DatabaseManager>,
}

impl AppState {
    /// Wire the SQLite repositories behind the service layer
    pub fn new(auth: &AuthConfig, db: Arc<DatabaseManager>) -> Self {
        let store = Arc::new(CaptainRepository::new(db.clone()));

        Self {
            captain_service: Arc::new(CaptainService::new(store, auth.uniform_login_errors)),
            blacklist: Arc::new(BlacklistRepository::new(db.clone())),
            auth: Arc::new(auth.clone()),
            db,
        }
    }
}
