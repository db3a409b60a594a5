//! Authentication service.
//!
//! Password registration and login for accounts. Passwords are hashed
//! with Argon2id; the plaintext never reaches the repository.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use facture_core::{AccountId, AccountRole, Email};

use crate::db::{AccountRepository, RepositoryError};
use crate::models::{Account, NewAccount};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
///
/// Handles account registration and password login.
pub struct AuthService<'a> {
    accounts: AccountRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            accounts: AccountRepository::new(pool),
        }
    }

    /// Register a new account with a hashed password.
    ///
    /// The parent reference must already have been resolved by the
    /// access policy; this enforces the role/parent invariant and hashes
    /// the password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password doesn't meet
    /// requirements, `AuthError::MissingParent` for a `User` role
    /// without a parent, `AuthError::EmailTaken` if the email is
    /// already registered, and `AuthError::ParentNotFound` if the parent
    /// reference does not resolve.
    pub async fn register(
        &self,
        name: String,
        email: Email,
        password: &str,
        role: AccountRole,
        parent_account: Option<AccountId>,
    ) -> Result<Account, AuthError> {
        validate_password(password)?;

        if role == AccountRole::User && parent_account.is_none() {
            return Err(AuthError::MissingParent);
        }

        let password_hash = hash_password(password)?;

        let account = self
            .accounts
            .create(&NewAccount {
                name,
                email,
                password_hash,
                role,
                parent_account,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::EmailTaken,
                RepositoryError::NotFound => AuthError::ParentNotFound,
                other => AuthError::Repository(other),
            })?;

        Ok(account)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email or a
    /// wrong password - the same error either way.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        // A malformed email can't match any account; same rejection.
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let account = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &account.password_hash)?;

        Ok(account)
    }
}

/// Validate password meets requirements.
pub(crate) fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
pub(crate) fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
pub(crate) fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
