//! Integration tests for invoices.

mod common;

use axum::http::StatusCode;
use facture_core::AccountRole;
use serde_json::json;

use common::TestApp;

fn sample_items() -> serde_json::Value {
    json!([
        { "name": "Widget", "qty": 2, "price": "10" },
        { "name": "Bracket", "qty": 1, "price": "5" },
    ])
}

#[tokio::test]
async fn save_and_fetch_round_trips_the_total() {
    let app = TestApp::spawn().await;
    app.seed_account("Acme", "admin@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;
    let cookie = app.login("admin@acme.test", "hunter2pass").await;

    let saved = app
        .post_json(
            "/invoices/save",
            &json!({
                "customerName": "Jordan",
                "customerNumber": "C-100",
                "products": sample_items(),
                "totalAmount": "25",
            }),
            Some(&cookie),
        )
        .await;
    assert_eq!(saved.status, StatusCode::OK, "{}", saved.body);
    let invoice_id = saved.body["invoiceId"].as_str().unwrap().to_string();

    let show = app
        .get(&format!("/invoices/{invoice_id}"), Some(&cookie))
        .await;
    assert_eq!(show.status, StatusCode::OK);
    assert_eq!(show.body["invoice"]["totalAmount"], "25");
    assert_eq!(show.body["invoice"]["customerName"], "Jordan");
    assert_eq!(show.body["invoice"]["products"].as_array().unwrap().len(), 2);
    assert_eq!(show.body["breadcrumb"], "Jordan");
}

#[tokio::test]
async fn save_without_a_total_computes_one() {
    let app = TestApp::spawn().await;
    app.seed_account("Acme", "admin@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;
    let cookie = app.login("admin@acme.test", "hunter2pass").await;

    let saved = app
        .post_json(
            "/invoices/save",
            &json!({
                "customerName": "Jordan",
                "customerNumber": "C-100",
                "products": sample_items(),
            }),
            Some(&cookie),
        )
        .await;
    assert_eq!(saved.status, StatusCode::OK);

    let list = app.get("/invoices/get-all", Some(&cookie)).await;
    assert_eq!(list.body["invoices"][0]["totalAmount"], "25");
}

#[tokio::test]
async fn save_rejects_a_mismatched_total() {
    let app = TestApp::spawn().await;
    app.seed_account("Acme", "admin@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;
    let cookie = app.login("admin@acme.test", "hunter2pass").await;

    let saved = app
        .post_json(
            "/invoices/save",
            &json!({
                "customerName": "Jordan",
                "customerNumber": "C-100",
                "products": sample_items(),
                "totalAmount": "30",
            }),
            Some(&cookie),
        )
        .await;
    assert_eq!(saved.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn save_rejects_empty_and_invalid_items() {
    let app = TestApp::spawn().await;
    app.seed_account("Acme", "admin@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;
    let cookie = app.login("admin@acme.test", "hunter2pass").await;

    let no_items = app
        .post_json(
            "/invoices/save",
            &json!({
                "customerName": "Jordan",
                "customerNumber": "C-100",
                "products": [],
            }),
            Some(&cookie),
        )
        .await;
    assert_eq!(no_items.status, StatusCode::BAD_REQUEST);

    // Decimal::MAX times two overflows; must come back as a 400
    let overflowing = app
        .post_json(
            "/invoices/save",
            &json!({
                "customerName": "Jordan",
                "customerNumber": "C-100",
                "products": [{
                    "name": "Widget",
                    "qty": 2,
                    "price": "79228162514264337593543950335",
                }],
            }),
            Some(&cookie),
        )
        .await;
    assert_eq!(overflowing.status, StatusCode::BAD_REQUEST);

    let zero_qty = app
        .post_json(
            "/invoices/save",
            &json!({
                "customerName": "Jordan",
                "customerNumber": "C-100",
                "products": [{ "name": "Widget", "qty": 0, "price": "10" }],
            }),
            Some(&cookie),
        )
        .await;
    assert_eq!(zero_qty.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn resave_with_id_updates_in_place() {
    let app = TestApp::spawn().await;
    app.seed_account("Acme", "admin@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;
    let cookie = app.login("admin@acme.test", "hunter2pass").await;

    let saved = app
        .post_json(
            "/invoices/save",
            &json!({
                "customerName": "Jordan",
                "customerNumber": "C-100",
                "products": sample_items(),
            }),
            Some(&cookie),
        )
        .await;
    let invoice_id = saved.body["invoiceId"].as_str().unwrap().to_string();

    let resaved = app
        .post_json(
            "/invoices/save",
            &json!({
                "invoiceId": invoice_id,
                "customerName": "Jordan Smith",
                "customerNumber": "C-100",
                "products": [{ "name": "Widget", "qty": 3, "price": "10" }],
            }),
            Some(&cookie),
        )
        .await;
    assert_eq!(resaved.status, StatusCode::OK);
    assert_eq!(resaved.body["invoiceId"], invoice_id);

    let list = app.get("/invoices/get-all", Some(&cookie)).await;
    let invoices = list.body["invoices"].as_array().unwrap();
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0]["customerName"], "Jordan Smith");
    assert_eq!(invoices[0]["totalAmount"], "30");
}

#[tokio::test]
async fn user_invoices_belong_to_the_parent_account() {
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

    let user_cookie = app.login("worker@acme.test", "workerpass1").await;
    let saved = app
        .post_json(
            "/invoices/save",
            &json!({
                "customerName": "Jordan",
                "customerNumber": "C-100",
                "products": sample_items(),
            }),
            Some(&user_cookie),
        )
        .await;
    assert_eq!(saved.status, StatusCode::OK);

    // The parent admin sees the invoice, attributed to its own account
    let admin_cookie = app.login("admin@acme.test", "hunter2pass").await;
    let list = app.get("/invoices/get-all", Some(&admin_cookie)).await;
    let invoices = list.body["invoices"].as_array().unwrap();
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0]["companyId"], admin.id.to_string());
}

#[tokio::test]
async fn invoices_are_invisible_across_tenants() {
    let app = TestApp::spawn().await;
    app.seed_account("One", "one@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;
    app.seed_account("Two", "two@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;

    let one_cookie = app.login("one@acme.test", "hunter2pass").await;
    let saved = app
        .post_json(
            "/invoices/save",
            &json!({
                "customerName": "Jordan",
                "customerNumber": "C-100",
                "products": sample_items(),
            }),
            Some(&one_cookie),
        )
        .await;
    let invoice_id = saved.body["invoiceId"].as_str().unwrap().to_string();

    let two_cookie = app.login("two@acme.test", "hunter2pass").await;
    let show = app
        .get(&format!("/invoices/{invoice_id}"), Some(&two_cookie))
        .await;
    assert_eq!(show.status, StatusCode::NOT_FOUND);

    // Resaving someone else's invoice reads as not found too
    let steal = app
        .post_json(
            "/invoices/save",
            &json!({
                "invoiceId": invoice_id,
                "customerName": "Mallory",
                "customerNumber": "C-666",
                "products": sample_items(),
            }),
            Some(&two_cookie),
        )
        .await;
    assert_eq!(steal.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_the_invoice() {
    let app = TestApp::spawn().await;
    app.seed_account("Acme", "admin@acme.test", "hunter2pass", AccountRole::Admin, None)
        .await;
    let cookie = app.login("admin@acme.test", "hunter2pass").await;

    let saved = app
        .post_json(
            "/invoices/save",
            &json!({
                "customerName": "Jordan",
                "customerNumber": "C-100",
                "products": sample_items(),
            }),
            Some(&cookie),
        )
        .await;
    let invoice_id = saved.body["invoiceId"].as_str().unwrap().to_string();

    let deleted = app
        .delete(&format!("/invoices/{invoice_id}"), Some(&cookie))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["success"], true);

    let gone = app
        .get(&format!("/invoices/{invoice_id}"), Some(&cookie))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invoices_require_a_session() {
    let app = TestApp::spawn().await;
    let response = app.get("/invoices/get-all", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
