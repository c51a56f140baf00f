//! Error types and handling
//!
//! All errors are converted to a consistent JSON response format.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Conflict - state conflict such as dependent rows (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unprocessable entity - validation failed (422)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    /// Classify a repository failure.
    ///
    /// Repositories wrap `sqlx` errors in context; the underlying database
    /// error is inspected rather than the outermost message.
    pub fn from_repository(err: anyhow::Error, action: &str) -> Self {
        let constraint = err
            .downcast_ref::<sqlx::Error>()
            .and_then(|e| match e {
                sqlx::Error::Database(db_err) => Some(db_err.message().to_string()),
                _ => None,
            });

        match constraint {
            Some(msg) if msg.contains("FOREIGN KEY constraint failed") => {
                tracing::warn!(error = %format!("{:#}", err), "{} violated a reference", action);
                AppError::Conflict(format!(
                    "{}: referenced organization or deal does not exist, or dependent records remain",
                    action
                ))
            }
            _ => {
                tracing::error!(error = %format!("{:#}", err), "{} failed", action);
                AppError::Internal(action.to_string())
            }
        }
    }
}

/// Error response body
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, should_log) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", false),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", false),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict", false),
            AppError::ValidationError(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", false)
            }
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", true),
        };

        if should_log {
            error!(error = %self, error_type = error_type, "Request error");
        }

        let body = ErrorResponse::new(error_type, self.to_string());

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
