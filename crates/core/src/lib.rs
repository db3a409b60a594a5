//! Facture Core - Shared types library.
//!
//! This crate provides common types used by the Facture server:
//! type-safe IDs, validated emails, account roles, product categories,
//! and prices.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP handling. This keeps it lightweight and allows it to be
//! used anywhere.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
