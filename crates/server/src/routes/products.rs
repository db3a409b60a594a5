//! Product handlers.
//!
//! All operations run inside the caller's resource scope: a `User` acts
//! on the parent account's catalogue, an `Admin` or `SA` on its own.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use facture_core::{Price, ProductCategory, ProductId};

use crate::db::products::ProductRepository;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{NewProduct, Product, ProductChanges};
use crate::policy;
use crate::state::AppState;

/// `GET /products/get-all`
pub async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let scope = policy::resource_scope(&user)?;
    let repo = ProductRepository::new(state.pool());
    let products = repo.list_owned(scope.account()).await?;
    Ok(Json(json!({ "products": products })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub category: String,
}

/// `POST /products/create`
///
/// Blocked for `User` callers; products belong to the owning account.
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    policy::check_create_product(&user)?;

    if body.name.trim().is_empty() || body.description.trim().is_empty() || body.category.is_empty()
    {
        return Err(AppError::Validation("Missing fields".to_string()));
    }
    let raw_price = body
        .price
        .ok_or_else(|| AppError::Validation("Missing fields".to_string()))?;
    let price =
        Price::new(raw_price).map_err(|e| AppError::Validation(format!("Invalid price: {e}")))?;
    let category = ProductCategory::from_str(&body.category)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let repo = ProductRepository::new(state.pool());
    let product = repo
        .create(&NewProduct {
            name: body.name,
            description: body.description,
            price,
            category,
            created_by: user.id,
        })
        .await?;

    tracing::info!(product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// `GET /products/{id}`
pub async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id)?;
    let scope = policy::resource_scope(&user)?;

    let repo = ProductRepository::new(state.pool());
    let product = repo
        .get_owned(id, scope.account())
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(json!({ "product": product, "breadcrumb": product.name })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub category: Option<String>,
}

/// `PUT /products/{id}`
pub async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id)?;
    let scope = policy::resource_scope(&user)?;

    let price = body
        .price
        .map(Price::new)
        .transpose()
        .map_err(|e| AppError::Validation(format!("Invalid price: {e}")))?;
    let category = body
        .category
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(ProductCategory::from_str)
        .transpose()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let changes = ProductChanges {
        name: body.name.filter(|n| !n.trim().is_empty()),
        description: body.description.filter(|d| !d.trim().is_empty()),
        price,
        category,
    };
    if changes.is_empty() {
        return Err(AppError::Validation("No fields to update".to_string()));
    }

    let repo = ProductRepository::new(state.pool());
    let product = repo
        .update_owned(id, scope.account(), user.id, &changes)
        .await
        .map_err(not_found_as_product)?;

    Ok(Json(json!({ "product": product })))
}

/// `DELETE /products/{id}`
pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id)?;
    let scope = policy::resource_scope(&user)?;

    let repo = ProductRepository::new(state.pool());
    repo.delete_owned(id, scope.account())
        .await
        .map_err(not_found_as_product)?;

    Ok(Json(json!({ "message": "Product deleted" })))
}

fn parse_id(raw: &str) -> Result<ProductId, AppError> {
    ProductId::parse(raw).map_err(|_| AppError::Validation("Invalid product id".to_string()))
}

fn not_found_as_product(err: crate::db::RepositoryError) -> AppError {
    match err {
        crate::db::RepositoryError::NotFound => {
            AppError::NotFound("Product not found".to_string())
        }
        other => AppError::Database(other),
    }
}
