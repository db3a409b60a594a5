//! Access policy: visibility scopes and permission checks.
//!
//! Every handler resolves the caller's [`CurrentUser`] identity first,
//! then asks this module two questions: is the action allowed, and which
//! records may it touch. The answers are pure values; no I/O happens
//! here, so a policy failure always short-circuits before any store
//! access.
//!
//! ## Rules
//!
//! - `SA` sees every account; `Admin` sees itself plus its direct
//!   children; `User` may not touch the accounts resource at all.
//! - For products and invoices, a `User` acts on behalf of its parent
//!   account: the owning-account filter is the parent's id, never the
//!   user's own. `Admin`/`SA` own their resources directly.
//! - A `User` may not create products.
//! - An identity may never delete its own account, and an account with
//!   children cannot be deleted (children would be orphaned).

use facture_core::{AccountId, AccountRole};

use crate::models::{Account, CurrentUser};

/// Policy violations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The role does not permit this action.
    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    /// A `User` identity without a parent cannot be scoped.
    #[error("parent account not assigned to user")]
    MissingParent,

    /// Deleting would orphan child accounts.
    #[error("account still has child accounts")]
    HasChildren,

    /// Invalid combination of fields in a request.
    #[error("{0}")]
    Validation(&'static str),
}

/// Which accounts an identity may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountScope {
    /// Every account (`SA`).
    All,
    /// The account itself plus its direct children (`Admin`).
    SelfAndChildren(AccountId),
}

/// The owning-account filter for products and invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerScope(pub AccountId);

impl OwnerScope {
    /// The account id records must be owned by.
    #[must_use]
    pub const fn account(self) -> AccountId {
        self.0
    }
}

/// Compute the account-resource visibility scope for an identity.
///
/// # Errors
///
/// Returns [`PolicyError::Forbidden`] for `User` identities; they have
/// no access to the accounts resource.
pub fn account_scope(user: &CurrentUser) -> Result<AccountScope, PolicyError> {
    match user.role {
        AccountRole::Sa => Ok(AccountScope::All),
        AccountRole::Admin => Ok(AccountScope::SelfAndChildren(user.id)),
        AccountRole::User => Err(PolicyError::Forbidden(
            "user accounts cannot manage accounts",
        )),
    }
}

/// Whether a single account record falls inside a visibility scope.
///
/// `getById` applies the same predicate as `list`: an `Admin` can fetch
/// itself and its direct children, nothing else.
#[must_use]
pub fn account_visible(scope: AccountScope, account: &Account) -> bool {
    match scope {
        AccountScope::All => true,
        AccountScope::SelfAndChildren(self_id) => {
            account.id == self_id || account.parent_account == Some(self_id)
        }
    }
}

/// Compute the owning-account filter for products and invoices.
///
/// A `User` never owns resources directly; they are always attributed to
/// its parent.
///
/// # Errors
///
/// Returns [`PolicyError::MissingParent`] for a `User` identity with no
/// parent reference.
pub fn resource_scope(user: &CurrentUser) -> Result<OwnerScope, PolicyError> {
    match user.role {
        AccountRole::User => user
            .parent_account
            .map(OwnerScope)
            .ok_or(PolicyError::MissingParent),
        AccountRole::Admin | AccountRole::Sa => Ok(OwnerScope(user.id)),
    }
}

/// Check whether an identity may create products.
///
/// # Errors
///
/// Returns [`PolicyError::Forbidden`] for `User` identities.
pub fn check_create_product(user: &CurrentUser) -> Result<(), PolicyError> {
    if user.role.is_admin() {
        Ok(())
    } else {
        Err(PolicyError::Forbidden("user accounts cannot create products"))
    }
}

/// Resolve the parent reference for a new account.
///
/// A `User` account is always created as a child: the explicit parent
/// from the payload wins when present, otherwise the creator becomes the
/// parent. `Admin`/`SA` accounts must not carry a parent.
///
/// # Errors
///
/// Returns [`PolicyError::Validation`] when an `Admin`/`SA` payload
/// carries a parent reference.
pub fn parent_for_new_account(
    role: AccountRole,
    creator: &CurrentUser,
    explicit: Option<AccountId>,
) -> Result<Option<AccountId>, PolicyError> {
    match role {
        AccountRole::User => Ok(Some(explicit.unwrap_or(creator.id))),
        AccountRole::Admin | AccountRole::Sa => {
            if explicit.is_some() {
                Err(PolicyError::Validation(
                    "admin accounts cannot have a parent account",
                ))
            } else {
                Ok(None)
            }
        }
    }
}

/// Check that changing an account's role keeps the role/parent
/// invariant intact: a `User` always has a parent, an `Admin`/`SA`
/// never does.
///
/// # Errors
///
/// Returns [`PolicyError::Validation`] when the new role conflicts with
/// the account's stored parent linkage.
pub fn check_role_change(new_role: AccountRole, target: &Account) -> Result<(), PolicyError> {
    match new_role {
        AccountRole::User if target.parent_account.is_none() => Err(PolicyError::Validation(
            "a user account requires a parent account",
        )),
        AccountRole::Admin | AccountRole::Sa if target.parent_account.is_some() => Err(
            PolicyError::Validation("admin accounts cannot have a parent account"),
        ),
        _ => Ok(()),
    }
}

/// Check whether an identity may delete a target account.
///
/// Self-deletion is rejected here, server-side, regardless of any
/// client-side guard. Deletion is also blocked while the target still
/// has children.
///
/// # Errors
///
/// Returns [`PolicyError::Forbidden`] for self-deletion and
/// [`PolicyError::HasChildren`] when children exist.
pub fn check_account_delete(user: &CurrentUser, target: &Account) -> Result<(), PolicyError> {
    if target.id == user.id {
        return Err(PolicyError::Forbidden("cannot delete your own account"));
    }
    if !target.children_accounts.is_empty() {
        return Err(PolicyError::HasChildren);
    }
    Ok(())
}
