//! Application-level error type and HTTP response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::InvoiceError;
use crate::policy::PolicyError;
use crate::services::{AuthError, TokenError};

/// Top-level error for HTTP handlers.
///
/// Every variant maps to a status code and a JSON body of the shape
/// `{"error": "..."}`. Internal details are logged, never exposed.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Status code and client-facing message for this error.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Database(RepositoryError::NotFound) => {
                (StatusCode::NOT_FOUND, "Not found".to_string())
            }
            Self::Database(RepositoryError::Conflict(msg)) => {
                (StatusCode::CONFLICT, msg.clone())
            }
            Self::Database(_) | Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
            ),
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            sentry::capture_message(&self.to_string(), sentry::Level::Error);
        } else {
            tracing::debug!(error = %self, status = %status, "request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            // The original API reports duplicate registration as a 400
            AuthError::EmailTaken => Self::Validation("Account already exists".to_string()),
            AuthError::WeakPassword(msg) => Self::Validation(msg),
            AuthError::MissingParent => {
                Self::Validation("A user account requires a parent account".to_string())
            }
            AuthError::ParentNotFound => Self::Validation("Parent account not found".to_string()),
            AuthError::Repository(e) => Self::Database(e),
            AuthError::PasswordHash => Self::Internal("password hashing failed".to_string()),
        }
    }
}

impl From<PolicyError> for AppError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::Forbidden(msg) => Self::Forbidden(msg.to_string()),
            PolicyError::MissingParent => {
                Self::Forbidden("No parent account is linked to this user".to_string())
            }
            PolicyError::HasChildren => Self::Conflict(
                "Cannot delete an account that still has child accounts".to_string(),
            ),
            PolicyError::Validation(msg) => Self::Validation(msg.to_string()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(_: TokenError) -> Self {
        Self::Unauthenticated
    }
}

impl From<InvoiceError> for AppError {
    fn from(err: InvoiceError) -> Self {
        Self::Validation(err.to_string())
    }
}
