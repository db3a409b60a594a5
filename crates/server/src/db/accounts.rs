//! Account repository.
//!
//! Creating a child account and linking it to its parent happens inside a
//! single transaction; the children side of the relation is derived by
//! query, so the two ends can never disagree.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use facture_core::{AccountId, AccountRole, Email};

use super::{RepositoryError, map_unique_violation};
use crate::models::{Account, AccountChanges, NewAccount};

/// Internal row type for account queries.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: String,
    role: String,
    name: String,
    email: String,
    password_hash: String,
    parent_account: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let id = AccountId::parse(&row.id)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid account id: {e}")))?;
        let role = AccountRole::from_str(&row.role)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid role: {e}")))?;
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let parent_account = row
            .parent_account
            .as_deref()
            .map(AccountId::parse)
            .transpose()
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid parent id: {e}")))?;

        Ok(Self {
            id,
            role,
            name: row.name,
            email,
            password_hash: row.password_hash,
            parent_account,
            children_accounts: Vec::new(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, role, name, email, password_hash, parent_account, created_at, updated_at \
     FROM account";

/// Repository for account database operations.
pub struct AccountRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new account.
    ///
    /// When `parent_account` is set, the parent's existence is checked and
    /// the insert happens in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already
    /// registered, `RepositoryError::NotFound` if the parent does not
    /// exist, and `RepositoryError::Database` for other failures.
    pub async fn create(&self, new: &NewAccount) -> Result<Account, RepositoryError> {
        let id = AccountId::generate();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        if let Some(parent) = new.parent_account {
            let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM account WHERE id = ?")
                .bind(parent.to_string())
                .fetch_one(&mut *tx)
                .await?;
            if exists == 0 {
                return Err(RepositoryError::NotFound);
            }
        }

        sqlx::query(
            "INSERT INTO account \
             (id, role, name, email, password_hash, parent_account, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(new.role.to_string())
        .bind(&new.name)
        .bind(new.email.as_str())
        .bind(&new.password_hash)
        .bind(new.parent_account.map(|p| p.to_string()))
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "email already registered"))?;

        tx.commit().await?;

        Ok(Account {
            id,
            role: new.role,
            name: new.name.clone(),
            email: new.email.clone(),
            password_hash: new.password_hash.clone(),
            parent_account: new.parent_account,
            children_accounts: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Get an account by email, without children (used for login).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, role, name, email, password_hash, parent_account, created_at, updated_at \
             FROM account WHERE email = ?",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an account by ID, with its derived children.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, role, name, email, password_hash, parent_account, created_at, updated_at \
             FROM account WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => {
                let mut account: Account = row.try_into()?;
                account.children_accounts = self.children_of(account.id).await?;
                Ok(Some(account))
            }
            None => Ok(None),
        }
    }

    /// List every account, children populated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<Account>, RepositoryError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "{SELECT_COLUMNS} ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        let accounts = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Account>, _>>()?;
        Ok(group_children(accounts))
    }

    /// List an account and its direct children, children populated.
    ///
    /// This is the Admin visibility scope: self plus accounts whose
    /// `parent_account` is self. Siblings and unrelated trees are never
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_self_and_children(
        &self,
        id: AccountId,
    ) -> Result<Vec<Account>, RepositoryError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "{SELECT_COLUMNS} WHERE id = ? OR parent_account = ? ORDER BY created_at DESC"
        ))
        .bind(id.to_string())
        .bind(id.to_string())
        .fetch_all(self.pool)
        .await?;

        let accounts = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Account>, _>>()?;
        Ok(group_children(accounts))
    }

    /// IDs of the direct children of an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn children_of(&self, id: AccountId) -> Result<Vec<AccountId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT id FROM account WHERE parent_account = ? ORDER BY created_at",
        )
        .bind(id.to_string())
        .fetch_all(self.pool)
        .await?;

        ids.iter()
            .map(|s| {
                AccountId::parse(s).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid account id: {e}"))
                })
            })
            .collect()
    }

    /// Apply a partial update; absent fields keep their stored value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account does not exist,
    /// `RepositoryError::Conflict` if the new email is taken.
    pub async fn update(
        &self,
        id: AccountId,
        changes: &AccountChanges,
    ) -> Result<Account, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE account SET \
             name = COALESCE(?, name), \
             email = COALESCE(?, email), \
             role = COALESCE(?, role), \
             password_hash = COALESCE(?, password_hash), \
             updated_at = ? \
             WHERE id = ?",
        )
        .bind(changes.name.as_deref())
        .bind(changes.email.as_ref().map(Email::as_str))
        .bind(changes.role.map(|r| r.to_string()))
        .bind(changes.password_hash.as_deref())
        .bind(now)
        .bind(id.to_string())
        .execute(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email already registered"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete an account.
    ///
    /// Does not cascade; callers are expected to have checked for
    /// children via the access policy first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account does not exist.
    pub async fn delete(&self, id: AccountId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM account WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Populate `children_accounts` from the fetched set itself.
///
/// Both visibility scopes (all accounts, self + children) fetch every
/// record that could be a child of a fetched parent, so grouping within
/// the result set is complete.
fn group_children(accounts: Vec<Account>) -> Vec<Account> {
    let mut children: HashMap<AccountId, Vec<AccountId>> = HashMap::new();
    for account in &accounts {
        if let Some(parent) = account.parent_account {
            children.entry(parent).or_default().push(account.id);
        }
    }

    accounts
        .into_iter()
        .map(|mut account| {
            account.children_accounts = children.remove(&account.id).unwrap_or_default();
            account
        })
        .collect()
}
