//! In-process tests for public pages that do not touch the database.

use axum::http::{StatusCode, header};

use menucochon_integration_tests::{body_text, get};

// ============================================================================
// Health & SEO
// ============================================================================

#[tokio::test]
async fn test_health() {
    let resp = get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "ok");
}

#[tokio::test]
async fn test_blog_index_rejects_bad_page_number() {
    for uri in ["/blogue?page=deux", "/en/blog?page=-1"] {
        let resp = get(uri).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn test_robots_txt() {
    let resp = get("/robots.txt").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_text(resp).await;
    assert!(body.contains("Disallow: /admin"));
    assert!(body.contains("Disallow: /api/"));
    assert!(body.contains("Sitemap: https://www.menucochon.com/sitemap.xml"));
}

// ============================================================================
// 404 Pages
// ============================================================================

#[tokio::test]
async fn test_unknown_french_path_renders_french_404() {
    let resp = get("/cette-page-nexiste-pas").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = body_text(resp).await;
    assert!(body.contains(r#"<html lang="fr-CA">"#));
    assert!(body.contains("Page introuvable"));
    assert!(body.contains(r#"<meta name="robots" content="noindex">"#));
}

#[tokio::test]
async fn test_unknown_english_path_renders_english_404() {
    let resp = get("/en/no-such-page").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = body_text(resp).await;
    assert!(body.contains(r#"<html lang="en-CA">"#));
    assert!(body.contains("Page not found"));
}

// ============================================================================
// Security Headers
// ============================================================================

#[tokio::test]
async fn test_security_headers_on_pages() {
    let resp = get("/no-such-page").await;
    let headers = resp.headers();

    assert_eq!(
        headers.get(header::X_FRAME_OPTIONS).and_then(|v| v.to_str().ok()),
        Some("DENY")
    );
    assert_eq!(
        headers
            .get(header::X_CONTENT_TYPE_OPTIONS)
            .and_then(|v| v.to_str().ok()),
        Some("nosniff")
    );
    assert!(headers.contains_key("permissions-policy"));
    assert!(headers.contains_key("x-request-id"));
    // Public pages stay cacheable
    assert!(!headers.contains_key(header::CACHE_CONTROL));
}

#[tokio::test]
async fn test_csp_nonce_matches_page_scripts() {
    let resp = get("/no-such-page").await;
    let csp = resp
        .headers()
        .get(header::CONTENT_SECURITY_POLICY)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("CSP header should be set");

    let nonce = csp
        .split("'nonce-")
        .nth(1)
        .and_then(|rest| rest.split('\'').next())
        .expect("CSP should carry a nonce")
        .to_string();
    assert!(!nonce.is_empty());

    let body = body_text(resp).await;
    assert!(body.contains(&format!(r#"nonce="{nonce}""#)));
}

#[tokio::test]
async fn test_each_request_gets_a_fresh_nonce() {
    let csp = |resp: axum::http::Response<axum::body::Body>| {
        resp.headers()
            .get(header::CONTENT_SECURITY_POLICY)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let first = csp(get("/no-such-page").await);
    let second = csp(get("/no-such-page").await);
    assert!(first.is_some());
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let resp = menucochon_integration_tests::send(
        menucochon_integration_tests::request("GET", "/health")
            .header("x-request-id", "test-request-123")
            .body(axum::body::Body::empty())
            .expect("Request should build"),
    )
    .await;

    assert_eq!(
        resp.headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("test-request-123")
    );
}
