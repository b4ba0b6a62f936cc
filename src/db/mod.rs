//! Database module
//!
//! This module provides database management functionality including:
//! - Database connection pool management
//! - Repository traits and SQLite implementations
//! - Database migrations
//! - Data models and schemas

pub mod manager;
pub mod models;
pub mod repository;
pub mod migrations;

pub use manager::DatabaseManager;
pub use models::{BlacklistedToken, Captain, Fullname, NewCaptain, Vehicle, VehicleType};
pub use repository::{BlacklistRepository, CaptainRepository, CaptainStore, TokenBlacklist};
