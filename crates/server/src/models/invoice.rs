//! Invoice domain types.
//!
//! An invoice stores its total redundantly; [`InvoiceData::validate`]
//! guarantees the stored total always equals the sum of its line items
//! before anything is persisted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use facture_core::{AccountId, InvoiceId};

/// A single invoice line: product name, quantity, unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub qty: u32,
    pub price: Decimal,
}

impl LineItem {
    /// The line subtotal (qty x unit price), `None` on overflow.
    #[must_use]
    pub fn subtotal(&self) -> Option<Decimal> {
        Decimal::from(self.qty).checked_mul(self.price)
    }
}

/// Validated invoice contents, ready to persist.
///
/// `company_id` is always derived from the caller's resource scope,
/// never trusted from the request payload.
#[derive(Debug, Clone)]
pub struct InvoiceData {
    pub customer_name: String,
    pub customer_number: String,
    pub company_id: AccountId,
    pub items: Vec<LineItem>,
    pub total_amount: Decimal,
}

/// Errors from invoice content validation.
#[derive(thiserror::Error, Debug, Clone)]
pub enum InvoiceError {
    #[error("customer name is required")]
    MissingCustomerName,
    #[error("customer number is required")]
    MissingCustomerNumber,
    #[error("invoice must contain at least one line item")]
    NoItems,
    #[error("line item {index}: name is required")]
    ItemMissingName { index: usize },
    #[error("line item {index}: quantity must be at least 1")]
    ItemZeroQuantity { index: usize },
    #[error("line item {index}: price must not be negative")]
    ItemNegativePrice { index: usize },
    #[error("total amount {given} does not match computed total {computed}")]
    TotalMismatch { given: Decimal, computed: Decimal },
    #[error("invoice total is too large")]
    TotalOverflow,
}

impl InvoiceData {
    /// Validate invoice contents and reconcile the total.
    ///
    /// When `given_total` is supplied it must equal the recomputed sum of
    /// the line items; either way the stored total is the computed one.
    ///
    /// # Errors
    ///
    /// Returns an [`InvoiceError`] describing the first offending field.
    pub fn validate(
        customer_name: String,
        customer_number: String,
        company_id: AccountId,
        items: Vec<LineItem>,
        given_total: Option<Decimal>,
    ) -> Result<Self, InvoiceError> {
        if customer_name.trim().is_empty() {
            return Err(InvoiceError::MissingCustomerName);
        }
        if customer_number.trim().is_empty() {
            return Err(InvoiceError::MissingCustomerNumber);
        }
        if items.is_empty() {
            return Err(InvoiceError::NoItems);
        }
        for (index, item) in items.iter().enumerate() {
            if item.name.trim().is_empty() {
                return Err(InvoiceError::ItemMissingName { index });
            }
            if item.qty == 0 {
                return Err(InvoiceError::ItemZeroQuantity { index });
            }
            if item.price < Decimal::ZERO {
                return Err(InvoiceError::ItemNegativePrice { index });
            }
        }

        let computed = compute_total(&items).ok_or(InvoiceError::TotalOverflow)?;
        if let Some(given) = given_total {
            if given != computed {
                return Err(InvoiceError::TotalMismatch { given, computed });
            }
        }

        Ok(Self {
            customer_name,
            customer_number,
            company_id,
            items,
            total_amount: computed,
        })
    }
}

/// Sum of qty x price over all line items, `None` on overflow.
#[must_use]
pub fn compute_total(items: &[LineItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.subtotal()?))
}

/// A persisted invoice (domain type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: InvoiceId,
    pub customer_name: String,
    pub customer_number: String,
    /// The owning account billing the customer.
    pub company_id: AccountId,
    /// Line items, in order. Serialized as `products` on the wire.
    #[serde(rename = "products")]
    pub items: Vec<LineItem>,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
