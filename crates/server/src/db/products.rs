//! Product repository.
//!
//! Every query is scoped to an owning account: visibility is enforced in
//! SQL, so an unscoped fetch path does not exist.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

use facture_core::{AccountId, Price, ProductCategory, ProductId};

use super::RepositoryError;
use crate::models::{NewProduct, Product, ProductChanges};

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    description: String,
    price: String,
    category: String,
    created_by: String,
    updated_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let id = ProductId::parse(&row.id)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid product id: {e}")))?;
        let price = Decimal::from_str(&row.price)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid price: {e}")))
            .and_then(|d| {
                Price::new(d)
                    .map_err(|e| RepositoryError::DataCorruption(format!("invalid price: {e}")))
            })?;
        let category = ProductCategory::from_str(&row.category)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid category: {e}")))?;
        let created_by = AccountId::parse(&row.created_by)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid owner id: {e}")))?;
        let updated_by = AccountId::parse(&row.updated_by)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid updater id: {e}")))?;

        Ok(Self {
            id,
            name: row.name,
            description: row.description,
            price,
            category,
            created_by,
            updated_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List products owned by an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_owned(&self, owner: AccountId) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, description, price, category, created_by, updated_by, \
             created_at, updated_at \
             FROM product WHERE created_by = ? ORDER BY created_at DESC",
        )
        .bind(owner.to_string())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a product by ID within an owner's scope.
    ///
    /// A product belonging to a different account is indistinguishable
    /// from a missing one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_owned(
        &self,
        id: ProductId,
        owner: AccountId,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, description, price, category, created_by, updated_by, \
             created_at, updated_at \
             FROM product WHERE id = ? AND created_by = ?",
        )
        .bind(id.to_string())
        .bind(owner.to_string())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let id = ProductId::generate();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO product \
             (id, name, description, price, category, created_by, updated_by, \
              created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price.amount().to_string())
        .bind(new.category.to_string())
        .bind(new.created_by.to_string())
        .bind(new.created_by.to_string())
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(Product {
            id,
            name: new.name.clone(),
            description: new.description.clone(),
            price: new.price,
            category: new.category,
            created_by: new.created_by,
            updated_by: new.created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update within an owner's scope.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product matches the id
    /// and owner.
    pub async fn update_owned(
        &self,
        id: ProductId,
        owner: AccountId,
        updated_by: AccountId,
        changes: &ProductChanges,
    ) -> Result<Product, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE product SET \
             name = COALESCE(?, name), \
             description = COALESCE(?, description), \
             price = COALESCE(?, price), \
             category = COALESCE(?, category), \
             updated_by = ?, \
             updated_at = ? \
             WHERE id = ? AND created_by = ?",
        )
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.price.map(|p| p.amount().to_string()))
        .bind(changes.category.map(|c| c.to_string()))
        .bind(updated_by.to_string())
        .bind(now)
        .bind(id.to_string())
        .bind(owner.to_string())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get_owned(id, owner)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product within an owner's scope.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product matches.
    pub async fn delete_owned(
        &self,
        id: ProductId,
        owner: AccountId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = ? AND created_by = ?")
            .bind(id.to_string())
            .bind(owner.to_string())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
