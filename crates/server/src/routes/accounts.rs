//! Account and session handlers.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::{Value, json};

use facture_core::{AccountId, AccountRole, Email};

use crate::db::accounts::AccountRepository;
use crate::error::AppError;
use crate::middleware::{OptionalAuth, RequireAdmin};
use crate::models::{Account, AccountChanges, AccountView, CurrentUser};
use crate::policy::{self, AccountScope};
use crate::services::{AuthService, SESSION_COOKIE, SESSION_TTL_DAYS, auth};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `POST /accounts/login`
///
/// Verifies credentials and sets the session cookie. Unknown email and
/// wrong password produce the same 401 response.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<Value>), AppError> {
    if body.email.is_empty() || body.password.is_empty() {
        return Err(AppError::Validation("Missing credentials".to_string()));
    }

    let auth = AuthService::new(state.pool());
    let account = auth.authenticate(&body.email, &body.password).await?;

    let token = state
        .tokens()
        .issue(&account)
        .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))?;

    let cookie = session_cookie(token, state.config().cookie_secure);
    tracing::info!(account_id = %account.id, "login");

    Ok((jar.add(cookie), Json(json!({ "message": "Logged in" }))))
}

/// `POST /accounts/logout`
///
/// Clears the session cookie. Always succeeds.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    (
        jar.remove(removal),
        Json(json!({ "message": "Logged out" })),
    )
}

/// `GET /accounts/me`
///
/// Returns the verified session identity, or `{"user": null}` with 401
/// when no valid session exists.
pub async fn me(OptionalAuth(user): OptionalAuth) -> Response {
    match user {
        Some(user) => Json(json!({
            "user": {
                "id": user.id,
                "email": user.email,
                "role": user.role,
            }
        }))
        .into_response(),
        None => (StatusCode::UNAUTHORIZED, Json(json!({ "user": null }))).into_response(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub parent_account: Option<String>,
}

/// `POST /accounts/create`
///
/// Creates an account. A `User`-role account is linked under a parent:
/// the explicit `parentAccount` when given, otherwise the creator.
pub async fn create(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if body.name.trim().is_empty()
        || body.email.is_empty()
        || body.password.is_empty()
        || body.role.is_empty()
    {
        return Err(AppError::Validation("Missing required fields".to_string()));
    }

    let email = Email::parse(&body.email)
        .map_err(|e| AppError::Validation(format!("Invalid email: {e}")))?;
    let role = AccountRole::from_str(&body.role)
        .map_err(|_| AppError::Validation("Invalid role".to_string()))?;
    let explicit_parent = body
        .parent_account
        .as_deref()
        .map(AccountId::parse)
        .transpose()
        .map_err(|_| AppError::Validation("Invalid parent account id".to_string()))?;

    let parent = policy::parent_for_new_account(role, &user, explicit_parent)?;

    let auth = AuthService::new(state.pool());
    let account = auth
        .register(body.name, email, &body.password, role, parent)
        .await?;

    tracing::info!(account_id = %account.id, role = %account.role, "account created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Account created" })),
    ))
}

/// `GET /accounts/get-all`
///
/// Lists accounts within the caller's scope: everything for `SA`, the
/// caller plus its children for `Admin`.
pub async fn list(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let repo = AccountRepository::new(state.pool());
    let accounts = match policy::account_scope(&user)? {
        AccountScope::All => repo.list_all().await?,
        AccountScope::SelfAndChildren(id) => repo.list_self_and_children(id).await?,
    };

    let views: Vec<AccountView> = accounts.iter().map(AccountView::from).collect();
    Ok(Json(json!({ "accounts": views })))
}

/// `GET /accounts/{id}`
pub async fn show(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let account = fetch_visible(&state, &user, &id).await?;
    let view = AccountView::from(&account);
    Ok(Json(json!({ "account": view, "breadcrumb": account.name })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// `PUT /accounts/{id}`
///
/// Partial update. A non-empty `password` is re-hashed; leaving it out
/// (or empty) keeps the stored hash untouched.
pub async fn update(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateAccountRequest>,
) -> Result<Json<Value>, AppError> {
    let account = fetch_visible(&state, &user, &id).await?;

    let email = body
        .email
        .as_deref()
        .filter(|e| !e.is_empty())
        .map(Email::parse)
        .transpose()
        .map_err(|e| AppError::Validation(format!("Invalid email: {e}")))?;
    let role = body
        .role
        .as_deref()
        .filter(|r| !r.is_empty())
        .map(AccountRole::from_str)
        .transpose()
        .map_err(|_| AppError::Validation("Invalid role".to_string()))?;
    if let Some(new_role) = role {
        policy::check_role_change(new_role, &account)?;
    }
    let password_hash = match body.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => {
            auth::validate_password(password)?;
            Some(auth::hash_password(password)?)
        }
        None => None,
    };

    let changes = AccountChanges {
        name: body.name.filter(|n| !n.trim().is_empty()),
        email,
        role,
        password_hash,
    };
    if changes.is_empty() {
        return Err(AppError::Validation("No fields to update".to_string()));
    }

    let repo = AccountRepository::new(state.pool());
    let updated = repo.update(account.id, &changes).await?;
    let view = AccountView::from(&updated);

    Ok(Json(json!({ "message": "Account updated", "account": view })))
}

/// `DELETE /accounts/{id}`
///
/// Rejects self-deletion and deletion of accounts that still have
/// children, both enforced here regardless of any client-side guard.
pub async fn delete(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let account = fetch_visible(&state, &user, &id).await?;
    policy::check_account_delete(&user, &account)?;

    let repo = AccountRepository::new(state.pool());
    repo.delete(account.id).await?;

    tracing::info!(account_id = %account.id, "account deleted");
    Ok(Json(json!({ "message": "Account deleted successfully" })))
}

/// Fetch an account by id, applying the caller's scope.
///
/// An account outside the caller's scope reads as not found, identical
/// to an account that does not exist.
async fn fetch_visible(
    state: &AppState,
    user: &CurrentUser,
    raw_id: &str,
) -> Result<Account, AppError> {
    let id = AccountId::parse(raw_id)
        .map_err(|_| AppError::Validation("Invalid account id".to_string()))?;
    let scope = policy::account_scope(user)?;

    let repo = AccountRepository::new(state.pool());
    let account = repo
        .find_by_id(id)
        .await?
        .filter(|a| policy::account_visible(scope, a))
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

    Ok(account)
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::days(SESSION_TTL_DAYS))
        .build()
}
