//! Product domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use facture_core::{AccountId, Price, ProductCategory, ProductId};

/// A product record (domain type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: ProductCategory,
    /// The owning account; visibility scoping filters on this field.
    pub created_by: AccountId,
    pub updated_by: AccountId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: ProductCategory,
    /// Owner and initial updater, taken from the caller's resource scope.
    pub created_by: AccountId,
}

/// Partial update for a product.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub category: Option<ProductCategory>,
}

impl ProductChanges {
    /// True when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
    }
}
