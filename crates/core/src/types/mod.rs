//! Domain types for Facture.
//!
//! - [`id`] - Newtype UUID wrappers for type-safe entity references
//! - [`email`] - Validated email addresses
//! - [`role`] - Account role enum
//! - [`category`] - Product category enum
//! - [`price`] - Positive decimal prices

pub mod category;
pub mod email;
pub mod id;
pub mod price;
pub mod role;

pub use category::{CategoryError, ProductCategory};
pub use email::{Email, EmailError};
pub use id::{AccountId, InvoiceId, ProductId};
pub use price::{Price, PriceError};
pub use role::AccountRole;
