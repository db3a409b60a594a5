pub mod auth;

pub use auth::{OptionalAuth, RequireAdmin, RequireAuth, admin_gate};
