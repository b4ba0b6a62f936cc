//! Captain Backend Library
//!
//! This library provides the authentication backend for captains (drivers):
//! registration, login, profile lookup and logout with token revocation,
//! backed by SQLite and served over a REST API.

pub mod api;
pub mod auth;
pub mod core;
pub mod db;

// Re-export commonly used types
pub use api::ApiServer;
pub use crate::core::{BackendError, CaptainService, Config};
pub use db::DatabaseManager;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias for the library
pub type Result<T> = anyhow::Result<T>;
