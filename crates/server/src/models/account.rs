//! Account domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use facture_core::{AccountId, AccountRole, Email};

/// An account record (domain type).
///
/// The password hash never leaves this type: [`AccountView`] is the
/// serializable projection used for API responses.
#[derive(Debug, Clone)]
pub struct Account {
    /// Unique account ID.
    pub id: AccountId,
    /// Permission level.
    pub role: AccountRole,
    /// Display name.
    pub name: String,
    /// Login email (unique).
    pub email: Email,
    /// Argon2 password hash.
    pub password_hash: String,
    /// Parent account; always set for `User` accounts, never for others.
    pub parent_account: Option<AccountId>,
    /// Direct children, derived from the store at load time.
    pub children_accounts: Vec<AccountId>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating an account. The password is already hashed by the
/// auth service before reaching the repository.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub role: AccountRole,
    pub parent_account: Option<AccountId>,
}

/// Partial update for an account.
///
/// `password_hash` is `Some` only when the caller supplied a non-empty
/// password; `None` leaves the stored hash untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub role: Option<AccountRole>,
    pub password_hash: Option<String>,
}

impl AccountChanges {
    /// True when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.password_hash.is_none()
    }
}

/// Serializable account projection for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: AccountId,
    pub role: AccountRole,
    pub name: String,
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_account: Option<AccountId>,
    pub children_accounts: Vec<AccountId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            role: account.role,
            name: account.name.clone(),
            email: account.email.clone(),
            parent_account: account.parent_account,
            children_accounts: account.children_accounts.clone(),
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// The verified identity of the caller, decoded from the session token.
///
/// This is produced by the session verifier and passed explicitly into
/// policy checks and handlers; there is no ambient current-user lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: AccountId,
    pub email: Email,
    pub role: AccountRole,
    /// Present only for `User`-role sessions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_account: Option<AccountId>,
}
