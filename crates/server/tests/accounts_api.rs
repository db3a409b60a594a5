//! Integration tests for sessions and account management.

mod common;

use axum::http::{StatusCode, header};
use facture_core::AccountRole;
use serde_json::json;

use common::{TestApp, account_id_by_email};

#[tokio::test]
async fn login_sets_cookie_and_me_returns_identity() {
    let app = TestApp::spawn().await;
    app.seed_account("Acme", "admin@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;

    let response = app
        .post_json(
            "/accounts/login",
            &json!({ "email": "admin@acme.test", "password": "hunter2pass" }),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Logged in");

    let set_cookie = response.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));

    let cookie = common::session_cookie(&response.headers);
    let me = app.get("/accounts/me", Some(&cookie)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["user"]["email"], "admin@acme.test");
    assert_eq!(me.body["user"]["role"], "Admin");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;
    app.seed_account("Acme", "admin@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;

    let unknown = app
        .post_json(
            "/accounts/login",
            &json!({ "email": "nobody@acme.test", "password": "hunter2pass" }),
            None,
        )
        .await;
    let wrong_password = app
        .post_json(
            "/accounts/login",
            &json!({ "email": "admin@acme.test", "password": "wrong-password" }),
            None,
        )
        .await;

    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.body, wrong_password.body);
    assert_eq!(unknown.body["error"], "Invalid email or password");
}

#[tokio::test]
async fn login_with_missing_credentials_is_rejected() {
    let app = TestApp::spawn().await;
    let response = app
        .post_json("/accounts/login", &json!({ "email": "a@b.test" }), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn me_without_session_returns_null_user() {
    let app = TestApp::spawn().await;
    let response = app.get("/accounts/me", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.body["user"].is_null());
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let app = TestApp::spawn().await;
    let response = app.post_json("/accounts/logout", &json!({}), None).await;
    assert_eq!(response.status, StatusCode::OK);

    let set_cookie = response.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("token="));
    // A removal cookie has an empty value
    assert!(set_cookie.starts_with("token=;") || set_cookie.starts_with("token=\"\""));
}

#[tokio::test]
async fn create_user_defaults_parent_to_creator() {
    let app = TestApp::spawn().await;
    let admin = app
        .seed_account("Acme", "admin@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;
    let cookie = app.login("admin@acme.test", "hunter2pass").await;

    let created = app
        .post_json(
            "/accounts/create",
            &json!({
                "name": "Worker",
                "email": "worker@acme.test",
                "password": "workerpass1",
                "role": "User",
            }),
            Some(&cookie),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);

    let list = app.get("/accounts/get-all", Some(&cookie)).await;
    let accounts = list.body["accounts"].as_array().unwrap();
    let worker = accounts
        .iter()
        .find(|a| a["email"] == "worker@acme.test")
        .expect("worker visible to creator");
    assert_eq!(worker["parentAccount"], admin.id.to_string());

    // And the parent's child list reflects the link
    let parent = accounts
        .iter()
        .find(|a| a["email"] == "admin@acme.test")
        .unwrap();
    assert_eq!(
        parent["childrenAccounts"],
        json!([worker["id"].as_str().unwrap()])
    );
}

#[tokio::test]
async fn create_duplicate_email_is_a_400() {
    let app = TestApp::spawn().await;
    app.seed_account("Acme", "admin@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;
    let cookie = app.login("admin@acme.test", "hunter2pass").await;

    let body = json!({
        "name": "Dup",
        "email": "dup@acme.test",
        "password": "duppassword",
        "role": "Admin",
    });
    let first = app.post_json("/accounts/create", &body, Some(&cookie)).await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app.post_json("/accounts/create", &body, Some(&cookie)).await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(second.body["error"], "Account already exists");
}

#[tokio::test]
async fn accounts_resource_requires_an_admin_session() {
    let app = TestApp::spawn().await;
    let admin = app
        .seed_account("Acme", "admin@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;
    app.seed_account(
        "Worker",
        "worker@acme.test",
        "workerpass1",
        AccountRole::User,
        Some(admin.id),
    )
    .await;

    let anonymous = app.get("/accounts/get-all", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let anonymous_create = app
        .post_json("/accounts/create", &json!({}), None)
        .await;
    assert_eq!(anonymous_create.status, StatusCode::UNAUTHORIZED);

    // The gate rejects User-role sessions on the whole prefix, not just
    // the listing
    let user_cookie = app.login("worker@acme.test", "workerpass1").await;
    let as_user = app.get("/accounts/get-all", Some(&user_cookie)).await;
    assert_eq!(as_user.status, StatusCode::FORBIDDEN);

    let user_create = app
        .post_json(
            "/accounts/create",
            &json!({
                "name": "Sneaky",
                "email": "sneaky@acme.test",
                "password": "sneakypass1",
                "role": "Admin",
            }),
            Some(&user_cookie),
        )
        .await;
    assert_eq!(user_create.status, StatusCode::FORBIDDEN);

    let user_show = app
        .get(&format!("/accounts/{}", admin.id), Some(&user_cookie))
        .await;
    assert_eq!(user_show.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn sa_sees_everything_admin_sees_self_and_children() {
    let app = TestApp::spawn().await;
    app.seed_account("Root", "sa@facture.test", "superadmin1", AccountRole::Sa, None)
        .await;
    let admin_one = app
        .seed_account("One", "one@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;
    app.seed_account("Two", "two@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;
    app.seed_account(
        "Worker",
        "worker@acme.test",
        "workerpass1",
        AccountRole::User,
        Some(admin_one.id),
    )
    .await;

    let sa_cookie = app.login("sa@facture.test", "superadmin1").await;
    let all = app.get("/accounts/get-all", Some(&sa_cookie)).await;
    assert_eq!(all.body["accounts"].as_array().unwrap().len(), 4);

    let one_cookie = app.login("one@acme.test", "hunter2pass").await;
    let scoped = app.get("/accounts/get-all", Some(&one_cookie)).await;
    let emails: Vec<&str> = scoped.body["accounts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails.len(), 2);
    assert!(emails.contains(&"one@acme.test"));
    assert!(emails.contains(&"worker@acme.test"));

    let two_cookie = app.login("two@acme.test", "hunter2pass").await;
    let solo = app.get("/accounts/get-all", Some(&two_cookie)).await;
    assert_eq!(solo.body["accounts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn fetching_an_account_outside_scope_reads_as_not_found() {
    let app = TestApp::spawn().await;
    app.seed_account("One", "one@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;
    let other = app
        .seed_account("Two", "two@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;

    let cookie = app.login("one@acme.test", "hunter2pass").await;
    let response = app
        .get(&format!("/accounts/{}", other.id), Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_without_password_keeps_the_stored_hash() {
    let app = TestApp::spawn().await;
    let admin = app
        .seed_account("Acme", "admin@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;
    let cookie = app.login("admin@acme.test", "hunter2pass").await;

    let response = app
        .put_json(
            &format!("/accounts/{}", admin.id),
            &json!({ "name": "Acme Renamed" }),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["account"]["name"], "Acme Renamed");

    // Old password still works
    app.login("admin@acme.test", "hunter2pass").await;
}

#[tokio::test]
async fn update_with_password_rehashes() {
    let app = TestApp::spawn().await;
    let admin = app
        .seed_account("Acme", "admin@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;
    let cookie = app.login("admin@acme.test", "hunter2pass").await;

    let response = app
        .put_json(
            &format!("/accounts/{}", admin.id),
            &json!({ "password": "betterpass9" }),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let old = app
        .post_json(
            "/accounts/login",
            &json!({ "email": "admin@acme.test", "password": "hunter2pass" }),
            None,
        )
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);
    app.login("admin@acme.test", "betterpass9").await;
}

#[tokio::test]
async fn role_changes_cannot_break_parent_linkage() {
    let app = TestApp::spawn().await;
    let admin = app
        .seed_account("Acme", "admin@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;
    app.seed_account(
        "Worker",
        "worker@acme.test",
        "workerpass1",
        AccountRole::User,
        Some(admin.id),
    )
    .await;
    let cookie = app.login("admin@acme.test", "hunter2pass").await;

    // Promoting a child would leave an admin with a parent
    let all = app.get("/accounts/get-all", Some(&cookie)).await;
    let worker_id = account_id_by_email(&all.body, "worker@acme.test");
    let promote = app
        .put_json(
            &format!("/accounts/{worker_id}"),
            &json!({ "role": "Admin" }),
            Some(&cookie),
        )
        .await;
    assert_eq!(promote.status, StatusCode::BAD_REQUEST);

    // Demoting a parentless admin would create an unscopable user
    let demote = app
        .put_json(
            &format!("/accounts/{}", admin.id),
            &json!({ "role": "User" }),
            Some(&cookie),
        )
        .await;
    assert_eq!(demote.status, StatusCode::BAD_REQUEST);

    // A no-op role write that respects the linkage still goes through
    let keep = app
        .put_json(
            &format!("/accounts/{worker_id}"),
            &json!({ "role": "User", "name": "Worker Two" }),
            Some(&cookie),
        )
        .await;
    assert_eq!(keep.status, StatusCode::OK);
    assert_eq!(keep.body["account"]["name"], "Worker Two");
}

#[tokio::test]
async fn deleting_your_own_account_is_rejected() {
    let app = TestApp::spawn().await;
    let admin = app
        .seed_account("Acme", "admin@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;
    let cookie = app.login("admin@acme.test", "hunter2pass").await;

    let response = app
        .delete(&format!("/accounts/{}", admin.id), Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deleting_an_account_with_children_is_blocked() {
    let app = TestApp::spawn().await;
    app.seed_account("Root", "sa@facture.test", "superadmin1", AccountRole::Sa, None)
        .await;
    let admin = app
        .seed_account("Acme", "admin@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;
    app.seed_account(
        "Worker",
        "worker@acme.test",
        "workerpass1",
        AccountRole::User,
        Some(admin.id),
    )
    .await;

    let cookie = app.login("sa@facture.test", "superadmin1").await;
    let blocked = app
        .delete(&format!("/accounts/{}", admin.id), Some(&cookie))
        .await;
    assert_eq!(blocked.status, StatusCode::CONFLICT);

    // Remove the child first, then the parent goes through
    let all = app.get("/accounts/get-all", Some(&cookie)).await;
    let worker_id = account_id_by_email(&all.body, "worker@acme.test");
    let child = app
        .delete(&format!("/accounts/{worker_id}"), Some(&cookie))
        .await;
    assert_eq!(child.status, StatusCode::OK);

    let parent = app
        .delete(&format!("/accounts/{}", admin.id), Some(&cookie))
        .await;
    assert_eq!(parent.status, StatusCode::OK);
    assert_eq!(parent.body["message"], "Account deleted successfully");
}

#[tokio::test]
async fn password_material_never_appears_in_responses() {
    let app = TestApp::spawn().await;
    let admin = app
        .seed_account("Acme", "admin@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;
    let cookie = app.login("admin@acme.test", "hunter2pass").await;

    let list = app.get("/accounts/get-all", Some(&cookie)).await;
    let show = app
        .get(&format!("/accounts/{}", admin.id), Some(&cookie))
        .await;

    for body in [&list.body, &show.body] {
        let raw = body.to_string();
        assert!(!raw.contains("password"));
        assert!(!raw.contains("argon2"));
    }
}
