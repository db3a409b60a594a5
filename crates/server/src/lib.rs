//! Facture server library.
//!
//! Multi-tenant business management API: accounts with a two-level
//! parent/child hierarchy, products, and invoices, behind cookie-based
//! session authentication.
//!
//! Exposed as a library so the HTTP surface can be exercised by
//! integration tests without binding a socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod routes;
pub mod services;
pub mod state;
