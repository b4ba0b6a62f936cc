//! Authentication module
//!
//! This module provides authentication functionality including:
//! - JWT token generation and validation
//! - Password hashing and verification
//! - Session cookie construction
//! - Token extraction and the captain authentication middleware

pub mod jwt;
pub mod password;
pub mod cookies;
pub mod middleware;

pub use jwt::{generate_token, validate_token, Claims};
pub use password::{hash_password, verify_password};
pub use cookies::{clear_session_cookie, session_cookie, TOKEN_COOKIE};
pub use middleware::{authenticate, extract_token, resolve_captain, AuthCaptain};
