//! In-process tests for JSON API validation and the Stripe webhook.
//!
//! Every request here is rejected (or fully handled) before its first query.

use axum::body::Body;
use axum::http::{StatusCode, header};
use serde_json::json;
use tower::ServiceExt;

use menucochon_integration_tests::{body_json, get, post_json, request, send};
use menucochon_site::stripe::sign_payload;

/// Webhook secret of `SiteConfig::for_tests`.
const WEBHOOK_SECRET: &str = "whsec_super_secret_value";

async fn post_webhook(payload: &str, signature: Option<&str>) -> axum::http::Response<Body> {
    let mut builder = request("POST", "/api/webhooks/stripe")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(signature) = signature {
        builder = builder.header("stripe-signature", signature);
    }
    send(
        builder
            .body(Body::from(payload.to_string()))
            .expect("Request should build"),
    )
    .await
}

fn signed(payload: &str, timestamp: i64) -> String {
    format!(
        "t={timestamp},v1={}",
        sign_payload(payload, WEBHOOK_SECRET, timestamp)
    )
}

// ============================================================================
// Newsletter, Ratings, Search
// ============================================================================

#[tokio::test]
async fn test_newsletter_rejects_invalid_email() {
    let resp = post_json("/api/newsletter", &json!({ "email": "pas-un-courriel" })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = body_json(resp).await;
    assert_eq!(body["error"], "Invalid email address");
}

#[tokio::test]
async fn test_rating_out_of_range() {
    for rating in [0, 6] {
        let resp = post_json("/api/ratings", &json!({ "recipe_id": 1, "rating": rating })).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "rating {rating}");
        let body = body_json(resp).await;
        assert_eq!(body["error"], "rating must be between 1 and 5");
    }
}

#[tokio::test]
async fn test_malformed_bodies_get_json_errors() {
    let resp = post_json("/api/ratings", &json!({ "recipe_id": 1, "rating": 4.5 })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(
        resp.headers()
            .get(header::CONTENT_TYPE)
            .is_some_and(|v| v.as_bytes().starts_with(b"application/json"))
    );
    let body = body_json(resp).await;
    assert_eq!(body["error"], "invalid request body");

    let resp = send(
        request("POST", "/api/checkout")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"items\": ["))
            .expect("Request should build"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "malformed JSON body");

    let resp = send(
        request("POST", "/api/newsletter")
            .body(Body::from("email=chef@menucochon.com"))
            .expect("Request should build"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "expected a JSON body");
}

#[tokio::test]
async fn test_malformed_query_gets_json_error() {
    let resp = get("/api/ratings?recipe_id=abc").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "invalid query string");
}

#[tokio::test]
async fn test_ingredient_search_requires_terms() {
    let resp = get("/api/ingredients/search?q=%20,%20;").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(resp).await["error"].is_string());
}

#[tokio::test]
async fn test_api_errors_are_not_cached() {
    let resp = post_json("/api/newsletter", &json!({ "email": "x" })).await;
    assert_eq!(
        resp.headers()
            .get(header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok()),
        Some("no-store, max-age=0")
    );
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_checkout_rejects_empty_cart() {
    let resp = post_json("/api/checkout", &json!({ "items": [], "locale": "fr" })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "cart is empty");
}

#[tokio::test]
async fn test_checkout_rejects_bad_quantity() {
    let resp = post_json(
        "/api/checkout",
        &json!({ "items": [{ "product_id": 1, "quantity": 0 }] }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_rejects_invalid_email() {
    let resp = post_json(
        "/api/checkout",
        &json!({ "items": [{ "product_id": 1, "quantity": 1 }], "email": "nope" }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Tracking Beacons
// ============================================================================

#[tokio::test]
async fn test_pageview_rejects_admin_paths() {
    let resp = post_json("/api/track/pageview", &json!({ "path": "/admin/orders" })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_affiliate_click_rejects_non_http_urls() {
    let resp = post_json(
        "/api/affiliate/click",
        &json!({ "url": "javascript:alert(1)" }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Stripe Webhook
// ============================================================================

#[tokio::test]
async fn test_webhook_requires_signature() {
    let resp = post_webhook(r#"{"id":"evt_1"}"#, None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await["error"],
        "Missing Stripe-Signature header"
    );
}

#[tokio::test]
async fn test_webhook_rejects_wrong_secret() {
    let payload = r#"{"id":"evt_1","type":"customer.created","data":{"object":{}}}"#;
    let now = unix_now();
    let signature = format!(
        "t={now},v1={}",
        sign_payload(payload, "whsec_someone_else", now)
    );

    let resp = post_webhook(payload, Some(&signature)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(
        body["error"]
            .as_str()
            .is_some_and(|e| e.starts_with("Invalid signature"))
    );
}

#[tokio::test]
async fn test_webhook_rejects_stale_timestamp() {
    let payload = r#"{"id":"evt_1","type":"customer.created","data":{"object":{}}}"#;
    let resp = post_webhook(payload, Some(&signed(payload, unix_now() - 3600))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_rejects_extreme_timestamps() {
    let payload = r#"{"id":"evt_1","type":"customer.created","data":{"object":{}}}"#;
    for timestamp in [i64::MIN, i64::MAX] {
        let signature = format!("t={timestamp},v1=00");
        let resp = post_webhook(payload, Some(&signature)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "t={timestamp}");
    }
}

#[tokio::test]
async fn test_webhook_rejects_tampered_payload() {
    let payload = r#"{"id":"evt_1","type":"customer.created","data":{"object":{}}}"#;
    let signature = signed(payload, unix_now());
    let tampered = payload.replace("evt_1", "evt_2");

    let resp = post_webhook(&tampered, Some(&signature)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_acknowledges_unhandled_event() {
    let payload = r#"{"id":"evt_1","type":"customer.created","data":{"object":{"id":"cus_1"}}}"#;
    let resp = post_webhook(payload, Some(&signed(payload, unix_now()))).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({ "received": true }));
}

#[tokio::test]
async fn test_webhook_rejects_malformed_session() {
    // Correctly signed, but the session object is missing required fields
    let payload =
        r#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{"foo":1}}}"#;
    let resp = post_webhook(payload, Some(&signed(payload, unix_now()))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_is_not_rate_limited() {
    let payload = r#"{"id":"evt_1","type":"customer.created","data":{"object":{}}}"#;
    let app = menucochon_integration_tests::test_app();
    for _ in 0..30 {
        let req = request("POST", "/api/webhooks/stripe")
            .header("stripe-signature", signed(payload, unix_now()))
            .body(Body::from(payload))
            .expect("Request should build");
        let resp = app.clone().oneshot(req).await.expect("Router is infallible");
        assert_eq!(resp.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_api_is_rate_limited_per_client() {
    let app = menucochon_integration_tests::test_app();
    let mut statuses = Vec::new();
    for _ in 0..60 {
        let req = request("POST", "/api/newsletter")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"email":"x"}"#))
            .expect("Request should build");
        let resp = app.clone().oneshot(req).await.expect("Router is infallible");
        statuses.push(resp.status());
    }

    assert_eq!(statuses.first(), Some(&StatusCode::BAD_REQUEST));
    assert_eq!(statuses.last(), Some(&StatusCode::TOO_MANY_REQUESTS));
}

fn unix_now() -> i64 {
    i64::try_from(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("Clock is after the epoch")
            .as_secs(),
    )
    .expect("Timestamp fits in i64")
}
