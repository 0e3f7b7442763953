//! End-to-end tests against a running site.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`mc-cli migrate`)
//! - The site running (`cargo run -p menucochon-site`)
//! - For the admin flow, an account created with `mc-cli admin create` and
//!   its credentials in `MC_TEST_ADMIN_EMAIL` / `MC_TEST_ADMIN_PASSWORD`
//!
//! Run with: cargo test -p menucochon-integration-tests -- --ignored

use reqwest::{Client, StatusCode, redirect::Policy};

use menucochon_integration_tests::site_base_url;

fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client")
}

#[tokio::test]
#[ignore = "Requires running site and database"]
async fn test_readiness() {
    let resp = client()
        .get(format!("{}/health/ready", site_base_url()))
        .send()
        .await
        .expect("Failed to reach site");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running site and database"]
async fn test_localized_indexes() {
    let base_url = site_base_url();
    for (path, lang) in [
        ("/recettes", "fr-CA"),
        ("/en/recipes", "en-CA"),
        ("/blogue", "fr-CA"),
        ("/en/blog", "en-CA"),
        ("/lexique", "fr-CA"),
        ("/boutique", "fr-CA"),
    ] {
        let resp = client()
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to get page");
        assert_eq!(resp.status(), StatusCode::OK, "{path}");

        let body = resp.text().await.expect("Failed to read response");
        assert!(body.contains(&format!(r#"<html lang="{lang}">"#)), "{path}");
        assert!(body.contains(r#"hreflang="fr-CA""#), "{path}");
        assert!(body.contains(r#"hreflang="en-CA""#), "{path}");
    }
}

#[tokio::test]
#[ignore = "Requires running site and database"]
async fn test_sitemap() {
    let resp = client()
        .get(format!("{}/sitemap.xml", site_base_url()))
        .send()
        .await
        .expect("Failed to get sitemap");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.expect("Failed to read response");
    assert!(body.starts_with("<?xml"));
    assert!(body.contains("<urlset"));
}

#[tokio::test]
#[ignore = "Requires running site and database"]
async fn test_ingredient_search() {
    let resp = client()
        .get(format!(
            "{}/api/ingredients/search?q=sirop%20d%27%C3%A9rable,%20farine",
            site_base_url()
        ))
        .send()
        .await
        .expect("Failed to search");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = resp.json().await.expect("Response should be JSON");
    assert!(body["terms"].is_array());
    assert!(body["results"].is_array());
}

#[tokio::test]
#[ignore = "Requires running site, database and an admin account"]
async fn test_admin_login_flow() {
    let (Ok(email), Ok(password)) = (
        std::env::var("MC_TEST_ADMIN_EMAIL"),
        std::env::var("MC_TEST_ADMIN_PASSWORD"),
    ) else {
        return;
    };
    let base_url = site_base_url();
    let client = client();

    let resp = client
        .post(format!("{base_url}/admin/login"))
        .form(&[("email", email.as_str()), ("password", "wrong-password-123")])
        .send()
        .await
        .expect("Failed to post login");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers()
            .get("location")
            .and_then(|v| v.to_str().ok()),
        Some("/admin/login?error=credentials")
    );

    let resp = client
        .post(format!("{base_url}/admin/login"))
        .form(&[("email", email.as_str()), ("password", password.as_str())])
        .send()
        .await
        .expect("Failed to post login");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = client
        .get(format!("{base_url}/admin"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("Tableau de bord"));

    let resp = client
        .get(format!("{base_url}/admin/subscribers.csv"))
        .send()
        .await
        .expect("Failed to export subscribers");
    assert_eq!(resp.status(), StatusCode::OK);
    let csv = resp.text().await.expect("Failed to read response");
    assert!(csv.starts_with("email,locale,subscribed_at"));

    let resp = client
        .post(format!("{base_url}/admin/logout"))
        .send()
        .await
        .expect("Failed to log out");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = client
        .get(format!("{base_url}/admin"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}
