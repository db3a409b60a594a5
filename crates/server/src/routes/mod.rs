//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (db connectivity)
//!
//! # Auth & accounts
//! POST /accounts/login         - Login, sets the session cookie
//! POST /accounts/logout        - Logout, clears the session cookie
//! GET  /accounts/me            - Current session identity
//! POST /accounts/create        - Create account (admin only)
//! GET  /accounts/get-all       - List accounts in scope (admin only)
//! GET  /accounts/{id}          - Fetch account (admin only, scoped)
//! PUT  /accounts/{id}          - Update account (admin only, scoped)
//! DELETE /accounts/{id}        - Delete account (admin only, scoped)
//!
//! # Products
//! GET  /products/get-all       - List products in scope
//! POST /products/create        - Create product (admin only)
//! GET  /products/{id}          - Fetch product (scoped)
//! PUT  /products/{id}          - Update product (scoped)
//! DELETE /products/{id}        - Delete product (scoped)
//!
//! # Invoices
//! GET  /invoices/get-all       - List invoices in scope
//! POST /invoices/save          - Create or update an invoice
//! GET  /invoices/{id}          - Fetch invoice (scoped)
//! DELETE /invoices/{id}        - Delete invoice (scoped)
//! ```

pub mod accounts;
pub mod health;
pub mod invoices;
pub mod products;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::middleware::admin_gate;
use crate::state::AppState;

/// Create the account routes router.
///
/// Everything except login/logout/me sits behind the admin gate, which
/// verifies the session independently of the handler extractors.
pub fn account_routes(state: AppState) -> Router<AppState> {
    let gated = Router::new()
        .route("/create", post(accounts::create))
        .route("/get-all", get(accounts::list))
        .route(
            "/{id}",
            get(accounts::show)
                .put(accounts::update)
                .delete(accounts::delete),
        )
        .route_layer(from_fn_with_state(state, admin_gate));

    Router::new()
        .route("/login", post(accounts::login))
        .route("/logout", post(accounts::logout))
        .route("/me", get(accounts::me))
        .merge(gated)
}

/// Create the product routes router. Creation is behind the admin gate.
pub fn product_routes(state: AppState) -> Router<AppState> {
    let gated = Router::new()
        .route("/create", post(products::create))
        .route_layer(from_fn_with_state(state, admin_gate));

    Router::new()
        .route("/get-all", get(products::list))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .merge(gated)
}

/// Create the invoice routes router.
pub fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route("/get-all", get(invoices::list))
        .route("/save", post(invoices::save))
        .route("/{id}", get(invoices::show).delete(invoices::delete))
}

/// Assemble the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .nest("/accounts", account_routes(state.clone()))
        .nest("/products", product_routes(state.clone()))
        .nest("/invoices", invoice_routes())
        .with_state(state)
}
