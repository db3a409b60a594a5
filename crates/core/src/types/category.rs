//! Product category enum.

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown category.
#[derive(thiserror::Error, Debug, Clone)]
#[error("invalid product category: {0}")]
pub struct CategoryError(pub String);

/// Fixed set of product categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductCategory {
    Electronics,
    Clothing,
    Books,
    Furniture,
    Other,
}

impl ProductCategory {
    /// All categories, in display order.
    pub const ALL: [Self; 5] = [
        Self::Electronics,
        Self::Clothing,
        Self::Books,
        Self::Furniture,
        Self::Other,
    ];
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Electronics => write!(f, "Electronics"),
            Self::Clothing => write!(f, "Clothing"),
            Self::Books => write!(f, "Books"),
            Self::Furniture => write!(f, "Furniture"),
            Self::Other => write!(f, "Other"),
        }
    }
}

impl std::str::FromStr for ProductCategory {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Electronics" => Ok(Self::Electronics),
            "Clothing" => Ok(Self::Clothing),
            "Books" => Ok(Self::Books),
            "Furniture" => Ok(Self::Furniture),
            "Other" => Ok(Self::Other),
            other => Err(CategoryError(other.to_owned())),
        }
    }
}
