//! Stateless session tokens.
//!
//! The session is an HS256-signed claim set carried in an http-only
//! cookie; there is no server-side session table. Claims hold the
//! account id, email, role, and - for `User` roles only - the parent
//! account reference used for resource scoping.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use facture_core::{AccountId, AccountRole, Email};

use crate::models::{Account, CurrentUser};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "token";

/// Session lifetime.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Errors from token issuance and verification.
#[derive(thiserror::Error, Debug)]
pub enum TokenError {
    /// The token is missing, malformed, expired, or forged. One variant
    /// for all of these so the rejection carries no detail a caller
    /// could probe.
    #[error("invalid session token")]
    Invalid,

    /// Signing failed (configuration problem, not caller input).
    #[error("failed to sign session token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Signed session claims.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: AccountId,
    email: Email,
    role: AccountRole,
    #[serde(rename = "parentAccount", skip_serializing_if = "Option::is_none")]
    parent_account: Option<AccountId>,
    iat: i64,
    exp: i64,
}

/// Issues and verifies session tokens with a server-held secret.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    /// Build a token service from the configured signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }

    /// Issue a session token for an authenticated account.
    ///
    /// The `parentAccount` claim is included only when the account has
    /// role `User` and a parent is set.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if encoding fails.
    pub fn issue(&self, account: &Account) -> Result<String, TokenError> {
        self.issue_with_ttl(account, Duration::days(SESSION_TTL_DAYS))
    }

    fn issue_with_ttl(&self, account: &Account, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let parent_account = if account.role == AccountRole::User {
            account.parent_account
        } else {
            None
        };

        let claims = Claims {
            id: account.id,
            email: account.email.clone(),
            role: account.role,
            parent_account,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        Ok(jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &self.encoding,
        )?)
    }

    /// Verify a session token and extract the caller's identity.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] for malformed, expired, or forged
    /// tokens.
    pub fn verify(&self, token: &str) -> Result<CurrentUser, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| TokenError::Invalid)?;

        Ok(CurrentUser {
            id: data.claims.id,
            email: data.claims.email,
            role: data.claims.role,
            parent_account: data.claims.parent_account,
        })
    }
}
