//! Error type system for the captain backend
//!
//! This module provides a single error enum with:
//! - HTTP status code mapping
//! - Per-field validation error lists
//! - Redaction of infrastructure failures in API responses
//! - Trace IDs on every error body

use crate::api::middleware::current_trace_id;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Message returned to clients for every 5xx error
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// A single failed validation rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path of the offending field, e.g. `vehicle.capacity`
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self
    }
}

/// Main error type for the captain backend
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    // System-level errors
    #[error("System initialization failed: {0}")]
    InitializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    // Request errors
    #[error("Validation failed: {} field error(s)", .0.len())]
    ValidationError(Vec<FieldError>),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    DuplicateResource(String),

    #[error("{0}")]
    InvalidCredentials(String),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    // Primitive failures
    #[error("Password hashing error: {0}")]
    HashingError(String),

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Task error: {0}")]
    TaskError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BackendError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            BackendError::ValidationError(_)
            | BackendError::InvalidRequest(_)
            | BackendError::DuplicateResource(_)
            | BackendError::InvalidCredentials(_) => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            BackendError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,

            // 500 Internal Server Error
            BackendError::InitializationError(_)
            | BackendError::ConfigError(_)
            | BackendError::DatabaseError(_)
            | BackendError::PoolError(_)
            | BackendError::HashingError(_)
            | BackendError::TokenError(_)
            | BackendError::TaskError(_)
            | BackendError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type name for API responses
    pub fn error_type(&self) -> &'static str {
        match self {
            BackendError::InitializationError(_) => "InitializationError",
            BackendError::ConfigError(_) => "ConfigError",
            BackendError::DatabaseError(_) => "DatabaseError",
            BackendError::PoolError(_) => "PoolError",
            BackendError::ValidationError(_) => "ValidationError",
            BackendError::InvalidRequest(_) => "InvalidRequest",
            BackendError::DuplicateResource(_) => "DuplicateResource",
            BackendError::InvalidCredentials(_) => "InvalidCredentials",
            BackendError::AuthenticationError(_) => "AuthenticationError",
            BackendError::HashingError(_) => "HashingError",
            BackendError::TokenError(_) => "TokenError",
            BackendError::TaskError(_) => "TaskError",
            BackendError::IoError(_) => "IoError",
        }
    }

    /// Whether the error is an infrastructure failure whose detail must not reach clients
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }
}

/// Error response structure for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Per-field validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    /// Unique trace ID for this error
    pub trace_id: String,
}

impl ErrorResponse {
    /// Create a new error response, reusing the current request's trace ID when there is one
    pub fn new(error: String, message: String) -> Self {
        Self {
            error,
            message,
            errors: None,
            trace_id: current_trace_id().unwrap_or_else(|| Uuid::new_v4().to_string()),
        }
    }

    /// Create an error response from a BackendError
    ///
    /// Internal errors are reduced to their type name and a generic message.
    pub fn from_error(error: &BackendError) -> Self {
        match error {
            BackendError::ValidationError(fields) => Self {
                errors: Some(fields.clone()),
                ..Self::new(error.error_type().to_string(), "Validation failed".to_string())
            },
            e if e.is_internal() => Self::new(
                "InternalServerError".to_string(),
                INTERNAL_ERROR_MESSAGE.to_string(),
            ),
            e => Self::new(e.error_type().to_string(), e.to_string()),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} (trace_id: {})",
            self.error, self.message, self.trace_id
        )
    }
}

/// Implement IntoResponse for BackendError to enable automatic error handling in Axum
impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = ErrorResponse::from_error(&self);

        if status_code.is_server_error() {
            tracing::error!(
                error_type = self.error_type(),
                trace_id = %error_response.trace_id,
                status_code = %status_code,
                "Request failed: {}",
                self
            );
        } else {
            tracing::warn!(
                error_type = self.error_type(),
                trace_id = %error_response.trace_id,
                status_code = %status_code,
                "Request rejected: {}",
                self
            );
        }

        (status_code, Json(error_response)).into_response()
    }
}

/// Result type alias for operations that can fail with BackendError
pub type Result<T> = std::result::Result<T, BackendError>;

/// Context extension trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| BackendError::InitializationError(format!("{}: {}", context.into(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            BackendError::ValidationError(vec![]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BackendError::DuplicateResource("taken".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BackendError::InvalidCredentials("nope".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BackendError::AuthenticationError("test".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            BackendError::DatabaseError(rusqlite::Error::InvalidQuery).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            BackendError::HashingError("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_duplicate_message_is_verbatim() {
        let error = BackendError::DuplicateResource("Captain with this email already exists".into());
        let response = ErrorResponse::from_error(&error);

        assert_eq!(response.error, "DuplicateResource");
        assert_eq!(response.message, "Captain with this email already exists");
        assert!(response.errors.is_none());
    }

    #[test]
    fn test_internal_errors_are_redacted() {
        let error = BackendError::HashingError("cost 99 is out of range".into());
        let response = ErrorResponse::from_error(&error);

        assert_eq!(response.error, "InternalServerError");
        assert_eq!(response.message, INTERNAL_ERROR_MESSAGE);
        assert!(!response.message.contains("cost"));
        assert!(!response.trace_id.is_empty());
    }

    #[test]
    fn test_validation_response_lists_fields() {
        let error = BackendError::ValidationError(vec![
            FieldError::new("email", "Invalid email address")
                .with_value(serde_json::json!("nope")),
            FieldError::new("vehicle.type", "Invalid vehicle type"),
        ]);
        let response = ErrorResponse::from_error(&error);
        let fields = response.errors.expect("field errors");

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field, "email");
        assert_eq!(fields[0].value, Some(serde_json::json!("nope")));
        assert_eq!(fields[1].message, "Invalid vehicle type");
    }

    #[test]
    fn test_error_context() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"));

        let err = result.context("Failed to open database").unwrap_err();
        assert!(err.to_string().contains("Failed to open database"));
        assert!(err.to_string().contains("file not found"));
    }
}
