//! JSON API used by the site's scripts and by Stripe.
//!
//! Every handler returns `ApiError` on failure, so error bodies are
//! `{"error": "..."}`. Browser-facing endpoints are rate limited per client
//! IP; the Stripe webhook is not (it is authenticated by signature instead).

pub mod checkout;
pub mod extract;
pub mod ingredients;
pub mod newsletter;
pub mod ratings;
pub mod tracking;
pub mod webhooks;

use axum::{
    Router,
    http::HeaderMap,
    routing::{get, post},
};

use menucochon_core::Locale;

pub use extract::{ApiJson, ApiQuery};

use crate::middleware::api_rate_limiter;
use crate::middleware::rate_limit::forwarded_client_ip;
use crate::state::AppState;

/// Create the `/api` router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/newsletter", post(newsletter::subscribe))
        .route("/ratings", get(ratings::summary).post(ratings::rate))
        .route("/ingredients/search", get(ingredients::search))
        .route("/checkout", post(checkout::create))
        .route("/affiliate/click", post(tracking::affiliate_click))
        .route("/track/pageview", post(tracking::page_view))
        .layer(api_rate_limiter())
        .route("/webhooks/stripe", post(webhooks::stripe))
}

/// Optional locale from a JSON body or query string; anything unknown is French.
fn locale_or_default(tag: Option<&str>) -> Locale {
    tag.and_then(|t| Locale::parse(t).ok()).unwrap_or_default()
}

/// Client address as reported by the proxy chain.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    forwarded_client_ip(headers).map(|ip| ip.to_string())
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|ua| ua.chars().take(512).collect())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_locale_or_default() {
        assert_eq!(locale_or_default(Some("en-US")), Locale::En);
        assert_eq!(locale_or_default(Some("de")), Locale::Fr);
        assert_eq!(locale_or_default(None), Locale::Fr);
    }

    #[test]
    fn test_client_ip() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), None);

        headers.insert("x-forwarded-for", HeaderValue::from_static("198.51.100.9, 10.0.0.1"));
        assert_eq!(client_ip(&headers).as_deref(), Some("198.51.100.9"));

        headers.insert("cf-connecting-ip", HeaderValue::from_static("203.0.113.5"));
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.5"));
    }
}
