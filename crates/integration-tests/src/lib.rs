//! Integration tests for Menucochon.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process router tests (no database needed)
//! cargo test -p menucochon-integration-tests
//!
//! # Live tests against a running site with a migrated database
//! SITE_BASE_URL=http://localhost:3000 cargo test -p menucochon-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `public_pages` - localized pages, 404s, SEO files and security headers
//! - `api` - JSON API validation and the Stripe webhook
//! - `admin` - back-office access control
//! - `live` - end-to-end flows against a running server (ignored by default)
//!
//! In-process tests build the real router over a lazily connected pool, so
//! anything that fails before its first query runs without `PostgreSQL`.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use menucochon_site::config::SiteConfig;
use menucochon_site::state::AppState;

/// Client address sent with every request, for the rate limiter.
pub const TEST_CLIENT_IP: &str = "203.0.113.10";

/// Base URL for live tests (configurable via environment).
#[must_use]
pub fn site_base_url() -> String {
    std::env::var("SITE_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Router over test configuration and a pool that never connects unless a
/// handler queries it.
///
/// # Panics
///
/// Panics if the test database URL does not parse.
#[must_use]
pub fn test_app() -> Router {
    let config = SiteConfig::for_tests();
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy("postgres://localhost/menucochon_test")
        .expect("Test database URL should parse");
    menucochon_site::app(AppState::new(config, pool))
}

/// A request builder preset with the client IP header.
#[must_use]
pub fn request(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("cf-connecting-ip", TEST_CLIENT_IP)
}

/// `GET uri` with an empty body.
///
/// # Panics
///
/// Panics if the request cannot be built or the router fails.
pub async fn get(uri: &str) -> Response<Body> {
    send(
        request("GET", uri)
            .body(Body::empty())
            .expect("Request should build"),
    )
    .await
}

/// `POST uri` with a JSON body.
///
/// # Panics
///
/// Panics if the request cannot be built or the router fails.
pub async fn post_json(uri: &str, body: &serde_json::Value) -> Response<Body> {
    send(
        request("POST", uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("Request should build"),
    )
    .await
}

/// Send one request through a fresh router.
///
/// # Panics
///
/// Panics if the router returns an error (it is infallible).
pub async fn send(request: Request<Body>) -> Response<Body> {
    test_app()
        .oneshot(request)
        .await
        .expect("Router is infallible")
}

/// Read a response body as text.
///
/// # Panics
///
/// Panics if the body cannot be read or is not UTF-8.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Body should be readable");
    String::from_utf8(bytes.to_vec()).expect("Body should be UTF-8")
}

/// Read a response body as JSON.
///
/// # Panics
///
/// Panics if the body is not JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).expect("Body should be JSON")
}
