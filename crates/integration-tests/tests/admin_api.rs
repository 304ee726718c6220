//! Admin router tests.
//!
//! Every `/api/admin` route sits behind the bearer token; validation runs
//! before any query, so these need no database.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use salon_shop_integration_tests::{
    ADMIN_ORIGIN, ADMIN_TOKEN, admin_app, get, json_body, json_request, send,
};
use serde_json::json;

#[tokio::test]
async fn test_health_needs_no_token() {
    let response = send(admin_app(), get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    for uri in [
        "/api/admin/dashboard",
        "/api/admin/orders",
        "/api/admin/products",
        "/api/admin/appointments",
    ] {
        let response = send(admin_app(), get(uri, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(
            json_body(response).await,
            json!({"success": false, "error": "Unauthorized"})
        );
    }

    let response = send(admin_app(), get("/api/admin/dashboard", Some("not-the-token"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_mutations_require_token() {
    let response = send(
        admin_app(),
        json_request("DELETE", "/api/admin/coupons/1", "", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_faq_validates_input() {
    let response = send(
        admin_app(),
        json_request(
            "POST",
            "/api/admin/faqs",
            r#"{"question": " ", "answer": "Yes"}"#,
            Some(ADMIN_TOKEN),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"success": false, "error": "question is required"})
    );
}

#[tokio::test]
async fn test_service_duration_validated() {
    let response = send(
        admin_app(),
        json_request(
            "POST",
            "/api/admin/services",
            r#"{"name": "Cut", "duration_minutes": 0, "price": "30.00"}"#,
            Some(ADMIN_TOKEN),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["success"], false);
}

#[tokio::test]
async fn test_empty_customer_update_rejected() {
    let response = send(
        admin_app(),
        json_request("PATCH", "/api/admin/customers/7", "{}", Some(ADMIN_TOKEN)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"success": false, "error": "Nothing to update"})
    );
}

#[tokio::test]
async fn test_appointment_schedule_rejects_unrepresentable_date() {
    let response = send(
        admin_app(),
        get("/api/admin/appointments?date=%2B262142-12-31", Some(ADMIN_TOKEN)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"success": false, "error": "Invalid date"})
    );
}

#[tokio::test]
async fn test_cors_preflight_for_admin_origin() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/admin/orders")
        .header("origin", ADMIN_ORIGIN)
        .header("access-control-request-method", "PATCH")
        .header("access-control-request-headers", "authorization")
        .body(Body::empty())
        .unwrap();
    let response = send(admin_app(), request).await;

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        ADMIN_ORIGIN
    );
}
