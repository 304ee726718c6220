//! Storefront router tests.
//!
//! These drive the real router in-process. No database is reachable, so they
//! cover what is decided before the first query: health, auth, input
//! validation and the response envelope.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use salon_shop_integration_tests::{
    CRON_SECRET, get, json_body, json_request, send, storefront_app,
};
use serde_json::json;

#[tokio::test]
async fn test_health_is_ok() {
    let response = send(storefront_app(), get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_fails_without_database() {
    let response = send(storefront_app(), get("/health/ready", None)).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let response = send(storefront_app(), get("/health", None)).await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_cron_requires_secret() {
    let response = send(
        storefront_app(),
        get("/api/cron/appointment-reminders", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        json_body(response).await,
        json!({"success": false, "error": "Unauthorized"})
    );

    let response = send(
        storefront_app(),
        get("/api/cron/appointment-reminders", Some("wrong-secret")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cron_without_smtp_is_unavailable() {
    let response = send(
        storefront_app(),
        json_request("POST", "/api/cron/appointment-reminders", "", Some(CRON_SECRET)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        json_body(response).await,
        json!({"success": false, "error": "Email delivery is not configured"})
    );
}

#[tokio::test]
async fn test_order_lookup_requires_valid_email() {
    let response = send(storefront_app(), get("/api/orders?email=nope", None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"success": false, "error": "A valid email address is required"})
    );

    let response = send(storefront_app(), get("/api/appointments", None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["success"], false);
}

#[tokio::test]
async fn test_quote_rejects_empty_cart() {
    let response = send(
        storefront_app(),
        json_request("POST", "/api/checkout/quote", r#"{"items": []}"#, None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"success": false, "error": "Your cart is empty"})
    );
}

#[tokio::test]
async fn test_availability_rejects_dates_outside_booking_window() {
    for date in ["%2B262142-12-31", "2020-01-01"] {
        let uri = format!("/api/appointments/availability?date={date}&service_id=1");
        let response = send(storefront_app(), get(&uri, None)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{date}");
        assert_eq!(
            json_body(response).await,
            json!({"success": false, "error": "Choose a date within the next 365 days"})
        );
    }
}

#[tokio::test]
async fn test_blank_coupon_code_rejected() {
    let response = send(
        storefront_app(),
        json_request(
            "POST",
            "/api/coupons/validate",
            r#"{"code": "  ", "subtotal": "40.00"}"#,
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"success": false, "error": "Please enter a coupon code"})
    );
}

#[tokio::test]
async fn test_malformed_order_body_uses_envelope() {
    let response = send(
        storefront_app(),
        json_request("POST", "/api/orders", "{not json", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = send(storefront_app(), get("/api/nothing-here", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
