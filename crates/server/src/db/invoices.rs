//! Invoice repository.
//!
//! Line items are stored as a JSON document alongside the invoice row,
//! preserving their order. All reads and writes are scoped to the owning
//! account (`company_id`).

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

use facture_core::{AccountId, InvoiceId};

use super::RepositoryError;
use crate::models::{Invoice, InvoiceData, LineItem};

/// Internal row type for invoice queries.
#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: String,
    customer_name: String,
    customer_number: String,
    company_id: String,
    items: String,
    total_amount: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = RepositoryError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let id = InvoiceId::parse(&row.id)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid invoice id: {e}")))?;
        let company_id = AccountId::parse(&row.company_id)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid company id: {e}")))?;
        let items: Vec<LineItem> = serde_json::from_str(&row.items)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid line items: {e}")))?;
        let total_amount = Decimal::from_str(&row.total_amount)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid total: {e}")))?;

        Ok(Self {
            id,
            customer_name: row.customer_name,
            customer_number: row.customer_number,
            company_id,
            items,
            total_amount,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for invoice database operations.
pub struct InvoiceRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> InvoiceRepository<'a> {
    /// Create a new invoice repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List invoices owned by an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_owned(&self, owner: AccountId) -> Result<Vec<Invoice>, RepositoryError> {
        let rows = sqlx::query_as::<_, InvoiceRow>(
            "SELECT id, customer_name, customer_number, company_id, items, total_amount, \
             created_at, updated_at \
             FROM invoice WHERE company_id = ? ORDER BY created_at DESC",
        )
        .bind(owner.to_string())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an invoice by ID within an owner's scope.
    ///
    /// An invoice belonging to a different account is indistinguishable
    /// from a missing one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_owned(
        &self,
        id: InvoiceId,
        owner: AccountId,
    ) -> Result<Option<Invoice>, RepositoryError> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            "SELECT id, customer_name, customer_number, company_id, items, total_amount, \
             created_at, updated_at \
             FROM invoice WHERE id = ? AND company_id = ?",
        )
        .bind(id.to_string())
        .bind(owner.to_string())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Insert a new invoice from validated data.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, data: &InvoiceData) -> Result<Invoice, RepositoryError> {
        let id = InvoiceId::generate();
        let now = Utc::now();
        let items_json = encode_items(&data.items)?;

        sqlx::query(
            "INSERT INTO invoice \
             (id, customer_name, customer_number, company_id, items, total_amount, \
              created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(&data.customer_name)
        .bind(&data.customer_number)
        .bind(data.company_id.to_string())
        .bind(&items_json)
        .bind(data.total_amount.to_string())
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(Invoice {
            id,
            customer_name: data.customer_name.clone(),
            customer_number: data.customer_number.clone(),
            company_id: data.company_id,
            items: data.items.clone(),
            total_amount: data.total_amount,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the contents of an existing invoice within an owner's
    /// scope.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no invoice matches the id
    /// and owner.
    pub async fn update_owned(
        &self,
        id: InvoiceId,
        data: &InvoiceData,
    ) -> Result<Invoice, RepositoryError> {
        let now = Utc::now();
        let items_json = encode_items(&data.items)?;

        let result = sqlx::query(
            "UPDATE invoice SET \
             customer_name = ?, customer_number = ?, items = ?, total_amount = ?, \
             updated_at = ? \
             WHERE id = ? AND company_id = ?",
        )
        .bind(&data.customer_name)
        .bind(&data.customer_number)
        .bind(&items_json)
        .bind(data.total_amount.to_string())
        .bind(now)
        .bind(id.to_string())
        .bind(data.company_id.to_string())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get_owned(id, data.company_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete an invoice within an owner's scope.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no invoice matches.
    pub async fn delete_owned(
        &self,
        id: InvoiceId,
        owner: AccountId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM invoice WHERE id = ? AND company_id = ?")
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

fn encode_items(items: &[LineItem]) -> Result<String, RepositoryError> {
    serde_json::to_string(items)
        .map_err(|e| RepositoryError::DataCorruption(format!("line items not serializable: {e}")))
}
