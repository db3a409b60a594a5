//! Shared helpers for integration tests.
//!
//! Each test gets its own in-memory `SQLite` database with migrations
//! applied, and exercises the full router in-process via
//! `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use facture_core::{AccountId, AccountRole, Email};
use facture_server::config::ServerConfig;
use facture_server::models::Account;
use facture_server::services::AuthService;
use facture_server::state::AppState;
use facture_server::{db, routes};

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    /// Build an app backed by a fresh in-memory database.
    pub async fn spawn() -> Self {
        // A single connection keeps the in-memory database alive for the
        // whole test.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("connect to in-memory sqlite");

        db::run_migrations(&pool).await.expect("run migrations");

        let config = ServerConfig {
            database_url: SecretString::from("sqlite::memory:"),
            host: "127.0.0.1".parse().expect("parse host"),
            port: 0,
            jwt_secret: SecretString::from("kX9#mQ2$vL8@nR4!pT6&wZ0*bC3^dF7%"),
            cookie_secure: false,
            sentry_dsn: None,
            sentry_environment: None,
        };

        let router = routes::router(AppState::new(config, pool.clone()));
        Self { router, pool }
    }

    /// Register an account directly through the auth service.
    pub async fn seed_account(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: AccountRole,
        parent: Option<AccountId>,
    ) -> Account {
        let auth = AuthService::new(&self.pool);
        auth.register(
            name.to_string(),
            Email::parse(email).expect("valid email"),
            password,
            role,
            parent,
        )
        .await
        .expect("seed account")
    }

    /// Log in and return the session cookie (`token=...`).
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post_json(
                "/accounts/login",
                &serde_json::json!({ "email": email, "password": password }),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        session_cookie(&response.headers)
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        self.send(request(axum::http::Method::GET, path, None, cookie))
            .await
    }

    pub async fn post_json(
        &self,
        path: &str,
        body: &Value,
        cookie: Option<&str>,
    ) -> TestResponse {
        self.send(request(axum::http::Method::POST, path, Some(body), cookie))
            .await
    }

    pub async fn put_json(&self, path: &str, body: &Value, cookie: Option<&str>) -> TestResponse {
        self.send(request(axum::http::Method::PUT, path, Some(body), cookie))
            .await
    }

    pub async fn delete(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        self.send(request(axum::http::Method::DELETE, path, None, cookie))
            .await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router never fails");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

fn request(
    method: axum::http::Method,
    path: &str,
    body: Option<&Value>,
    cookie: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body).expect("serialize body")))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    }
}

/// Extract the `token=...` pair from a `Set-Cookie` header.
pub fn session_cookie(headers: &HeaderMap) -> String {
    let set_cookie = headers
        .get(header::SET_COOKIE)
        .expect("Set-Cookie header present")
        .to_str()
        .expect("valid header value");
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

/// Pull the id of the account with the given email out of a
/// `GET /accounts/get-all` response.
pub fn account_id_by_email(body: &Value, email: &str) -> String {
    body["accounts"]
        .as_array()
        .expect("accounts array")
        .iter()
        .find(|a| a["email"] == email)
        .unwrap_or_else(|| panic!("no account with email {email}"))["id"]
        .as_str()
        .expect("id string")
        .to_string()
}
