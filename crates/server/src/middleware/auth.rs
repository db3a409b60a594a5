//! Authentication middleware and extractors.
//!
//! Provides extractors that read the session cookie, verify its token
//! and hand the decoded [`CurrentUser`] to route handlers.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use crate::models::CurrentUser;
use crate::services::SESSION_COOKIE;
use crate::state::AppState;

/// Extractor that requires an authenticated user.
///
/// Rejects with 401 Unauthorized when the session cookie is missing,
/// expired or fails verification.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but absent or invalid.
pub enum AuthRejection {
    /// No valid session token.
    Unauthorized,
    /// Authenticated but lacking the required role.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Authentication required" })),
            )
                .into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "Admin access required" })),
            )
                .into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = current_user(&parts.headers, state).ok_or(AuthRejection::Unauthorized)?;
        Ok(Self(user))
    }
}

/// Extractor that optionally reads the current user.
///
/// Unlike [`RequireAuth`], this never rejects the request.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(&parts.headers, state)))
    }
}

/// Extractor that requires an authenticated `Admin` or `SA` user.
///
/// Rejects with 401 when unauthenticated and 403 when the caller holds
/// the plain `User` role.
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = current_user(&parts.headers, state).ok_or(AuthRejection::Unauthorized)?;
        if !user.role.is_admin() {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(user))
    }
}

/// Route-prefix gate for admin-only surfaces.
///
/// Runs before the handlers (and their extractors) and verifies the
/// session cookie independently: no valid session is a 401, a `User`
/// role is a 403. Handlers behind this layer still do their own checks;
/// the two enforcement points do not share state.
pub async fn admin_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(user) = current_user(request.headers(), &state) else {
        return AuthRejection::Unauthorized.into_response();
    };
    if !user.role.is_admin() {
        return AuthRejection::Forbidden.into_response();
    }
    next.run(request).await
}

/// Read and verify the session cookie from request headers.
fn current_user(headers: &HeaderMap, state: &AppState) -> Option<CurrentUser> {
    let jar = CookieJar::from_headers(headers);
    let token = jar.get(SESSION_COOKIE)?;
    state.tokens().verify(token.value()).ok()
}
