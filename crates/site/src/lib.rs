//! Menucochon site library.
//!
//! The bilingual recipe site, shop and back-office as a library, so the
//! binary, the CLI and the integration tests share one router and one data
//! layer.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod filters;
pub mod i18n;
pub mod llm;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod search;
pub mod services;
pub mod state;
pub mod storage;
pub mod stripe;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, header::CACHE_CONTROL};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{
    SecurityHeaders, create_session_layer, csp_nonce_middleware, request_id_middleware,
    security_headers_middleware,
};
use crate::state::AppState;

/// Directory served under `/static`, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/site/static";

/// Templates only link fingerprinted assets, so they never change in place.
const STATIC_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Build the full application router.
///
/// Layers, innermost first: admin sessions, CSP nonce, security headers
/// (they read the nonce back from the response), request ID, HTTP tracing,
/// then Sentry around everything.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.pool(), state.config());
    let security = Arc::new(SecurityHeaders::from_config(state.config()));

    Router::new()
        .merge(routes::routes())
        .nest_service(
            "/static",
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::if_not_present(
                    CACHE_CONTROL,
                    HeaderValue::from_static(STATIC_CACHE_CONTROL),
                ))
                .service(ServeDir::new(STATIC_DIR)),
        )
        .layer(session_layer)
        .layer(axum::middleware::from_fn(csp_nonce_middleware))
        .layer(axum::middleware::from_fn_with_state(
            security,
            security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
