//! HTTP middleware stack for the site.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry (hub per request, HTTP transactions)
//! 2. `TraceLayer`
//! 3. Request ID
//! 4. Security headers (reads the nonce back from the response)
//! 5. CSP nonce
//! 6. Admin sessions (signed cookie, `PostgreSQL` store)
//! 7. Rate limiting, per route (JSON API and the login form)

pub mod auth;
pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{LOGIN_PATH, RequireAdmin, clear_current_admin, set_current_admin};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::{api_rate_limiter, login_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::{SecurityHeaders, security_headers_middleware};
pub use session::create_session_layer;
