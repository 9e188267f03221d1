use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A single failed field check, reported back to the client in `details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Application-wide error types for Klinik.
#[derive(Error, Debug)]
pub enum AppError {
    /// The requested entity (or one of its parents) does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Input failed validation. Carries one entry per offending field.
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        details: Vec<FieldError>,
    },

    /// Missing, expired, or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to perform the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unique constraint or state conflict.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An upstream service (e.g. Google token verification) failed.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    pub fn not_found(entity: &str, id: impl fmt::Display) -> Self {
        AppError::NotFound(format!("{entity} {id}"))
    }

    /// Validation error for a single field.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        let detail = FieldError::new(field, message);
        AppError::Validation {
            message: detail.to_string(),
            details: vec![detail],
        }
    }

    /// Validation error without field details (e.g. a malformed body).
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// Build a validation error from collected field errors.
    pub fn from_field_errors(details: Vec<FieldError>) -> Self {
        let message = match details.as_slice() {
            [single] => single.to_string(),
            many => format!("{} fields are invalid", many.len()),
        };
        AppError::Validation { message, details }
    }

    /// Returns true for errors caused by the caller rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::NotFound(_)
                | AppError::Validation { .. }
                | AppError::Unauthorized(_)
                | AppError::Forbidden(_)
                | AppError::Conflict(_)
                | AppError::SerializationError(_)
        )
    }
}
