//! Domain records for accounts, products, and invoices.

pub mod account;
pub mod invoice;
pub mod product;

pub use account::{Account, AccountChanges, AccountView, CurrentUser, NewAccount};
pub use invoice::{Invoice, InvoiceData, InvoiceError, LineItem};
pub use product::{NewProduct, Product, ProductChanges};
