//! Per-request CSP nonce.
//!
//! Page templates put the nonce on their `<script>` tags (the site script and
//! the GA4 snippet); `security_headers_middleware` puts the same value in the
//! `script-src` directive.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;

/// Nonce bytes before base64 encoding.
const NONCE_BYTES: usize = 16;

/// Base64 of 128 random bits, fresh for every request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CspNonce(pub String);

impl CspNonce {
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(STANDARD.encode(bytes))
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Store a fresh nonce in the request extensions (for page handlers) and in
/// the response extensions (for the CSP header).
pub async fn csp_nonce_middleware(mut request: Request, next: Next) -> Response {
    let nonce = CspNonce::generate();
    request.extensions_mut().insert(nonce.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(nonce);
    response
}

impl<S> FromRequestParts<S> for CspNonce
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(nonce) = parts.extensions.get::<Self>() {
            return Ok(nonce.clone());
        }
        // Scripts without a matching nonce are blocked, so the page still renders safely
        tracing::warn!(path = %parts.uri.path(), "No CSP nonce on request");
        Ok(Self(String::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_is_unique_and_base64() {
        let a = CspNonce::generate();
        let b = CspNonce::generate();
        assert_ne!(a, b);
        assert_eq!(STANDARD.decode(a.value()).map(|d| d.len()).ok(), Some(NONCE_BYTES));
    }

    #[tokio::test]
    async fn test_extractor_without_middleware_yields_empty_nonce() {
        let (mut parts, ()) = axum::http::Request::new(()).into_parts();
        let nonce = CspNonce::from_request_parts(&mut parts, &()).await;
        assert_eq!(nonce.ok().map(|n| n.0), Some(String::new()));
    }
}
