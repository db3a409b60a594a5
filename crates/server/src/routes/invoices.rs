//! Invoice handlers.
//!
//! The owning account (`companyId`) is always derived from the caller's
//! resource scope; any value in the payload is ignored.

use axum::Json;
use axum::extract::{Path, State};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use facture_core::InvoiceId;

use crate::db::RepositoryError;
use crate::db::invoices::InvoiceRepository;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{InvoiceData, LineItem};
use crate::policy;
use crate::state::AppState;

/// `GET /invoices/get-all`
pub async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let scope = policy::resource_scope(&user)?;
    let repo = InvoiceRepository::new(state.pool());
    let invoices = repo.list_owned(scope.account()).await?;
    Ok(Json(json!({ "invoices": invoices })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveInvoiceRequest {
    #[serde(default)]
    pub invoice_id: Option<String>,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_number: String,
    /// Line items, named `products` on the wire.
    #[serde(default)]
    pub products: Vec<LineItem>,
    #[serde(default)]
    pub total_amount: Option<Decimal>,
}

/// `POST /invoices/save`
///
/// Create-or-update: with `invoiceId` the existing invoice is replaced
/// in place, without it a new one is created. The stored total is
/// recomputed from the line items; a supplied `totalAmount` that does
/// not match is rejected.
pub async fn save(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<SaveInvoiceRequest>,
) -> Result<Json<Value>, AppError> {
    let scope = policy::resource_scope(&user)?;

    let data = InvoiceData::validate(
        body.customer_name,
        body.customer_number,
        scope.account(),
        body.products,
        body.total_amount,
    )?;

    let repo = InvoiceRepository::new(state.pool());
    let invoice = match body.invoice_id.as_deref() {
        Some(raw) => {
            let id = parse_id(raw)?;
            repo.update_owned(id, &data)
                .await
                .map_err(not_found_as_invoice)?
        }
        None => repo.insert(&data).await?,
    };

    tracing::info!(invoice_id = %invoice.id, "invoice saved");
    Ok(Json(json!({ "invoiceId": invoice.id })))
}

/// `GET /invoices/{id}`
pub async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id)?;
    let scope = policy::resource_scope(&user)?;

    let repo = InvoiceRepository::new(state.pool());
    let invoice = repo
        .get_owned(id, scope.account())
        .await?
        .ok_or_else(|| AppError::NotFound("Invoice not found".to_string()))?;

    Ok(Json(
        json!({ "invoice": invoice, "breadcrumb": invoice.customer_name }),
    ))
}

/// `DELETE /invoices/{id}`
pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id)?;
    let scope = policy::resource_scope(&user)?;

    let repo = InvoiceRepository::new(state.pool());
    repo.delete_owned(id, scope.account())
        .await
        .map_err(not_found_as_invoice)?;

    Ok(Json(json!({ "success": true })))
}

fn parse_id(raw: &str) -> Result<InvoiceId, AppError> {
    InvoiceId::parse(raw).map_err(|_| AppError::Validation("Invalid invoice id".to_string()))
}

fn not_found_as_invoice(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound("Invoice not found".to_string()),
        other => AppError::Database(other),
    }
}
