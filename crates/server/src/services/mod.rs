//! Business services: authentication and session tokens.

pub mod auth;
pub mod token;

pub use auth::{AuthError, AuthService};
pub use token::{SESSION_COOKIE, SESSION_TTL_DAYS, TokenError, TokenService};
