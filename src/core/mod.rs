//! Core application module
//!
//! This module provides the core application layer including:
//! - Business logic services
//! - Configuration management
//! - Structured logging system
//! - Error handling and type system
//! - Background pruning of the token blacklist

pub mod services;
pub mod config;
pub mod logging;
pub mod error;
pub mod blacklist_pruner;

pub use services::CaptainService;
pub use config::Config;
pub use logging::Logger;
pub use error::{BackendError, ErrorResponse, FieldError, Result, ErrorContext};
