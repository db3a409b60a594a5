//! Account role enum.

use serde::{Deserialize, Serialize};

/// Account role with different permission levels.
///
/// The role decides both what an account may do and which records it can
/// see: `SA` and `Admin` accounts own their resources directly, while a
/// `User` account always belongs to a parent account and acts on the
/// parent's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountRole {
    /// A child account; resources are attributed to its parent.
    User,
    /// A tenant owner; sees itself and its direct children.
    Admin,
    /// Super admin; sees every account.
    #[serde(rename = "SA")]
    Sa,
}

impl AccountRole {
    /// Whether this role is allowed on the admin-only surfaces
    /// (account management, product creation).
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::Sa)
    }
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "User"),
            Self::Admin => write!(f, "Admin"),
            Self::Sa => write!(f, "SA"),
        }
    }
}

impl std::str::FromStr for AccountRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(Self::User),
            "Admin" => Ok(Self::Admin),
            "SA" => Ok(Self::Sa),
            _ => Err(format!("invalid account role: {s}")),
        }
    }
}
