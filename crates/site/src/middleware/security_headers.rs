//! Security headers middleware for XSS, clickjacking, and isolation protection.
//!
//! Adds restrictive security headers to all responses. Start locked down and
//! loosen only when specific functionality requires it: recipe images come
//! from the storage bucket, videos embed from youtube-nocookie, checkout
//! redirects to Stripe, and GA4 loads when a measurement ID is configured.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY,
            X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use super::CspNonce;
use crate::config::SiteConfig;

const GA4_SCRIPT_HOST: &str = "https://www.googletagmanager.com";
const GA4_CONNECT_HOSTS: &str = "https://*.google-analytics.com https://*.analytics.google.com";
const YOUTUBE_FRAME_HOST: &str = "https://www.youtube-nocookie.com";
const YOUTUBE_THUMB_HOST: &str = "https://i.ytimg.com";
const STRIPE_CHECKOUT_HOST: &str = "https://checkout.stripe.com";

const PERMISSIONS_POLICY: &str = "accelerometer=(), \
     ambient-light-sensor=(), \
     autoplay=(), \
     battery=(), \
     browsing-topics=(), \
     camera=(), \
     display-capture=(), \
     document-domain=(), \
     encrypted-media=(self \"https://www.youtube-nocookie.com\"), \
     fullscreen=(self \"https://www.youtube-nocookie.com\"), \
     geolocation=(), \
     gyroscope=(), \
     hid=(), \
     idle-detection=(), \
     interest-cohort=(), \
     magnetometer=(), \
     microphone=(), \
     midi=(), \
     payment=(), \
     picture-in-picture=(), \
     publickey-credentials-get=(), \
     screen-wake-lock=(), \
     serial=(), \
     usb=(), \
     xr-spatial-tracking=()";

/// Precomputed header settings derived from the site configuration.
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    /// CSP with a `{nonce}` placeholder in `script-src`.
    csp_template: String,
    hsts: bool,
}

impl SecurityHeaders {
    #[must_use]
    pub fn from_config(config: &SiteConfig) -> Self {
        let ga4 = config.analytics.ga4_measurement_id.is_some();

        let mut script_src = String::from("'self' 'nonce-{nonce}'");
        let mut connect_src = String::from("'self'");
        let mut img_src = format!("'self' data: {YOUTUBE_THUMB_HOST}");
        if ga4 {
            script_src.push(' ');
            script_src.push_str(GA4_SCRIPT_HOST);
            connect_src.push(' ');
            connect_src.push_str(GA4_CONNECT_HOSTS);
            img_src.push_str(" https://*.google-analytics.com");
        }
        if let Some(origin) = config
            .storage_public_url
            .as_deref()
            .and_then(origin_of)
        {
            img_src.push(' ');
            img_src.push_str(&origin);
        }

        let csp_template = format!(
            "default-src 'none'; \
             script-src {script_src}; \
             style-src 'self'; \
             font-src 'self'; \
             img-src {img_src}; \
             connect-src {connect_src}; \
             frame-src {YOUTUBE_FRAME_HOST}; \
             object-src 'none'; \
             base-uri 'self'; \
             form-action 'self' {STRIPE_CHECKOUT_HOST}; \
             frame-ancestors 'none'; \
             upgrade-insecure-requests"
        );

        Self {
            csp_template,
            hsts: config.is_secure(),
        }
    }

    /// Content-Security-Policy value for one response.
    #[must_use]
    pub fn csp(&self, nonce: Option<&CspNonce>) -> String {
        match nonce {
            Some(nonce) => self.csp_template.replace("{nonce}", nonce.value()),
            None => self.csp_template.replace(" 'nonce-{nonce}'", ""),
        }
    }
}

/// Scheme and host of a URL, as CSP source expressions want it.
fn origin_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let origin = parsed.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY` - Prevent clickjacking
/// - `X-Content-Type-Options: nosniff` - Prevent MIME sniffing
/// - `Referrer-Policy: strict-origin-when-cross-origin`
/// - `Content-Security-Policy` - Strict CSP with a per-request script nonce
/// - `Permissions-Policy` - Deny sensitive features, allow video fullscreen
/// - `Strict-Transport-Security` - When served over HTTPS
/// - `Cache-Control: no-store` - Admin and API responses only
/// - `Cross-Origin-Opener-Policy: same-origin` - Process isolation
/// - `Cross-Origin-Resource-Policy: same-origin` - Resource isolation
/// - `X-DNS-Prefetch-Control: off` - Prevent DNS prefetch leakage
pub async fn security_headers_middleware(
    State(settings): State<Arc<SecurityHeaders>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    let private = path.starts_with("/admin") || path.starts_with("/api/");

    let mut response = next.run(request).await;
    let csp = settings.csp(response.extensions().get::<CspNonce>());
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    if let Ok(value) = HeaderValue::from_str(&csp) {
        headers.insert(CONTENT_SECURITY_POLICY, value);
    }

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(PERMISSIONS_POLICY),
    );

    if settings.hsts {
        headers.insert(
            STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=63072000; includeSubDomains"),
        );
    }

    if private {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    }

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-resource-policy"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("x-dns-prefetch-control"),
        HeaderValue::from_static("off"),
    );

    response
}
