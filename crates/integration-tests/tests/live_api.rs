//! Live tests against running servers.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`salon-cli migrate`)
//! - The storefront running (`cargo run -p salon-shop-storefront`)
//! - The admin API running with `ADMIN_API_TOKEN` exported to this shell
//! - For the reminder test: SMTP configured on the storefront and its
//!   `CRON_SECRET` exported to this shell
//!
//! Run with: `cargo test -p salon-shop-integration-tests -- --ignored`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{TimeDelta, Utc};
use reqwest::{Client, StatusCode};
use salon_shop_integration_tests::{admin_base_url, storefront_base_url};
use serde_json::{Value, json};

fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

fn admin_token() -> String {
    std::env::var("ADMIN_API_TOKEN").expect("ADMIN_API_TOKEN must be set for live admin tests")
}

async fn get_json(url: &str) -> (StatusCode, Value) {
    let resp = client().get(url).send().await.expect("Request failed");
    let status = resp.status();
    (status, resp.json().await.expect("Response was not JSON"))
}

fn unique_suffix() -> i64 {
    Utc::now().timestamp_micros()
}

async fn admin_get(path: &str) -> Value {
    let resp = client()
        .get(format!("{}{path}", admin_base_url()))
        .bearer_auth(admin_token())
        .send()
        .await
        .expect("Request failed");
    assert_eq!(resp.status(), StatusCode::OK, "{path}");
    resp.json().await.unwrap()
}

async fn admin_create(path: &str, body: &Value) -> i64 {
    let resp = client()
        .post(format!("{}{path}", admin_base_url()))
        .bearer_auth(admin_token())
        .json(body)
        .send()
        .await
        .expect("Create failed");
    assert_eq!(resp.status(), StatusCode::CREATED, "{path}");
    let created: Value = resp.json().await.unwrap();
    created["data"]["id"].as_i64().unwrap()
}

async fn admin_delete(path: &str) {
    client()
        .delete(format!("{}{path}", admin_base_url()))
        .bearer_auth(admin_token())
        .send()
        .await
        .expect("Delete failed");
}

async fn place_order(body: &Value) -> (StatusCode, Value) {
    let resp = client()
        .post(format!("{}/api/orders", storefront_base_url()))
        .json(body)
        .send()
        .await
        .expect("Request failed");
    let status = resp.status();
    (status, resp.json().await.expect("Response was not JSON"))
}

fn money(value: &Value) -> f64 {
    value.as_str().unwrap().parse().unwrap()
}

// ============================================================================
// Storefront
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_store_settings() {
    let (status, body) = get_json(&format!("{}/api/store/settings", storefront_base_url())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"]["currency"].is_string());
    assert!(body["data"]["booking"]["slot_minutes"].is_number());
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_product_listing_is_paginated() {
    let (status, body) = get_json(&format!(
        "{}/api/products?page=1&per_page=5&sort=price_asc",
        storefront_base_url()
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert!(data["items"].as_array().unwrap().len() <= 5);
    assert_eq!(data["page"], 1);
    assert_eq!(data["per_page"], 5);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_unknown_order_is_not_found() {
    let (status, body) = get_json(&format!(
        "{}/api/orders/ORD-DOESNOTEXIST?email=nobody@example.com",
        storefront_base_url()
    ))
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "error": "Order not found"}));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_unknown_coupon_is_rejected() {
    let resp = client()
        .post(format!("{}/api/coupons/validate", storefront_base_url()))
        .json(&json!({"code": "NO-SUCH-CODE-42", "subtotal": "80.00"}))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
}

// ============================================================================
// Storefront + admin
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront, admin server, database and ADMIN_API_TOKEN"]
async fn test_order_placement_updates_stock_and_coupon() {
    let suffix = unique_suffix();
    let product_id = admin_create(
        "/api/admin/products",
        &json!({
            "name": format!("Live test shampoo {suffix}"),
            "slug": format!("live-test-shampoo-{suffix}"),
            "price": "12.50",
            "stock_quantity": 3
        }),
    )
    .await;
    let coupon_code = format!("LIVE{suffix}");
    let coupon_id = admin_create(
        "/api/admin/coupons",
        &json!({"code": coupon_code, "kind": "percentage", "value": "10"}),
    )
    .await;

    let order = json!({
        "customer": {"name": "Live Test", "email": "live-test@example.com"},
        "items": [{"product_id": product_id, "quantity": 2}],
        "delivery_method": "pickup",
        "payment_method": "card_on_pickup",
        "coupon_code": coupon_code,
        "idempotency_key": format!("live-{suffix}")
    });

    let (status, first) = place_order(&order).await;
    assert_eq!(status, StatusCode::CREATED, "{first}");
    let order_number = first["data"]["order_number"].as_str().unwrap().to_string();
    assert!((money(&first["data"]["subtotal"]) - 25.0).abs() < f64::EPSILON);
    assert!((money(&first["data"]["discount"]) - 2.5).abs() < f64::EPSILON);
    assert_eq!(first["data"]["items"].as_array().unwrap().len(), 1);

    // Same key, same customer: the original order, nothing new written.
    let (status, replay) = place_order(&order).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replay["data"]["order_number"], order_number.as_str());

    // Same key, another customer: refused.
    let mut stranger = order.clone();
    stranger["customer"]["email"] = json!("someone-else@example.com");
    let (status, body) = place_order(&stranger).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let product = admin_get(&format!("/api/admin/products/{product_id}")).await;
    assert_eq!(product["data"]["stock_quantity"], 1);
    let coupon = admin_get(&format!("/api/admin/coupons/{coupon_id}")).await;
    assert_eq!(coupon["data"]["usage_count"], 1);

    // Only one left: the whole order rolls back.
    let mut too_many = order.clone();
    too_many["idempotency_key"] = json!(format!("live-{suffix}-again"));
    let (status, body) = place_order(&too_many).await;
    assert!(
        status == StatusCode::CONFLICT || status == StatusCode::BAD_REQUEST,
        "{status} {body}"
    );
    assert_eq!(body["success"], false);

    let product = admin_get(&format!("/api/admin/products/{product_id}")).await;
    assert_eq!(product["data"]["stock_quantity"], 1);
    let coupon = admin_get(&format!("/api/admin/coupons/{coupon_id}")).await;
    assert_eq!(coupon["data"]["usage_count"], 1);

    admin_delete(&format!("/api/admin/coupons/{coupon_id}")).await;
    admin_delete(&format!("/api/admin/products/{product_id}")).await;
}

#[tokio::test]
#[ignore = "Requires running storefront with SMTP, admin server, database, ADMIN_API_TOKEN and CRON_SECRET"]
async fn test_reminder_cron_stamps_due_appointment() {
    let cron_secret = std::env::var("CRON_SECRET").expect("CRON_SECRET must be set");
    let suffix = unique_suffix();
    let service_id = admin_create(
        "/api/admin/services",
        &json!({
            "name": format!("Live test trim {suffix}"),
            "duration_minutes": 30,
            "price": "20.00"
        }),
    )
    .await;

    // First free slot inside the next day, which the default lookahead covers.
    let now = Utc::now();
    let mut slot = None;
    for date in [now.date_naive(), now.date_naive() + TimeDelta::days(1)] {
        let (status, body) = get_json(&format!(
            "{}/api/appointments/availability?date={date}&service_id={service_id}",
            storefront_base_url()
        ))
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        slot = body["data"]["slots"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["starts_at"].as_str().unwrap().to_string())
            .find(|starts_at| {
                starts_at
                    .parse::<chrono::DateTime<Utc>>()
                    .is_ok_and(|t| t <= now + TimeDelta::hours(23))
            });
        if slot.is_some() {
            break;
        }
    }
    let scheduled_at = slot.expect("no free slot within the next day");

    let resp = client()
        .post(format!("{}/api/appointments", storefront_base_url()))
        .json(&json!({
            "customer": {"name": "Live Test", "email": "live-test@example.com"},
            "service_id": service_id,
            "scheduled_at": scheduled_at
        }))
        .send()
        .await
        .expect("Booking failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let booked: Value = resp.json().await.unwrap();
    let appointment_id = booked["data"]["id"].as_i64().unwrap();
    assert!(booked["data"]["reminder_sent_at"].is_null());

    let resp = client()
        .post(format!("{}/api/cron/appointment-reminders", storefront_base_url()))
        .bearer_auth(&cron_secret)
        .send()
        .await
        .expect("Cron call failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let report: Value = resp.json().await.unwrap();
    assert!(report["data"]["sent"].as_u64().unwrap() >= 1, "{report}");

    let appointment = admin_get(&format!("/api/admin/appointments/{appointment_id}")).await;
    assert!(appointment["data"]["reminder_sent_at"].is_string());

    let resp = client()
        .patch(format!(
            "{}/api/admin/appointments/{appointment_id}/status",
            admin_base_url()
        ))
        .bearer_auth(admin_token())
        .json(&json!({"status": "cancelled"}))
        .send()
        .await
        .expect("Cancel failed");
    assert_eq!(resp.status(), StatusCode::OK);
    admin_delete(&format!("/api/admin/services/{service_id}")).await;
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server, database and ADMIN_API_TOKEN"]
async fn test_dashboard_counts_every_status() {
    let resp = client()
        .get(format!("{}/api/admin/dashboard", admin_base_url()))
        .bearer_auth(admin_token())
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let statuses: Vec<&str> = body["data"]["orders_by_status"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["status"].as_str().unwrap())
        .collect();
    assert_eq!(
        statuses,
        ["pending", "confirmed", "processing", "shipped", "delivered", "cancelled"]
    );
}

#[tokio::test]
#[ignore = "Requires running admin server, database and ADMIN_API_TOKEN"]
async fn test_faq_crud_round_trip() {
    let base_url = admin_base_url();
    let token = admin_token();

    let resp = client()
        .post(format!("{base_url}/api/admin/faqs"))
        .bearer_auth(&token)
        .json(&json!({"question": "Integration test question?", "answer": "Yes."}))
        .send()
        .await
        .expect("Create failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    let id = created["data"]["id"].as_i64().unwrap();

    let resp = client()
        .put(format!("{base_url}/api/admin/faqs/{id}"))
        .bearer_auth(&token)
        .json(&json!({"question": "Integration test question?", "answer": "Still yes.", "is_active": false}))
        .send()
        .await
        .expect("Update failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["data"]["answer"], "Still yes.");
    assert_eq!(updated["data"]["is_active"], false);

    let resp = client()
        .delete(format!("{base_url}/api/admin/faqs/{id}"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Delete failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client()
        .get(format!("{base_url}/api/admin/faqs/{id}"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Get failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
