//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid credentials (unknown email or wrong password). A single
    /// variant for both so callers cannot tell which applied.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Email is already registered.
    #[error("account already exists")]
    EmailTaken,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// A `User` account requires a parent reference.
    #[error("user accounts require a parent account")]
    MissingParent,

    /// The referenced parent account does not exist.
    #[error("parent account not found")]
    ParentNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
