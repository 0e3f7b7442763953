//! Back-office route handlers, mounted under `/admin`.
//!
//! ```text
//! GET  /login                  - Login page
//! POST /login                  - Login form (rate limited)
//! POST /logout                 - Logout
//! GET  /                       - Dashboard
//! GET  /recipes?page=          - Recipe list
//! POST /recipes/{id}/publish   - Publish or unpublish a recipe
//! GET  /orders                 - Recent orders
//! GET  /orders/{id}            - Order detail
//! GET  /analytics              - Page views and affiliate clicks
//! GET  /subscribers.csv        - Newsletter export
//! ```
//!
//! Everything except the login page requires [`RequireAdmin`](crate::middleware::RequireAdmin).
//! The back-office is French only.

pub mod analytics;
pub mod auth;
pub mod dashboard;
pub mod orders;
pub mod recipes;
pub mod subscribers;

use axum::{
    Router,
    routing::{get, post},
};

use menucochon_core::{Currency, Locale, Price};

use crate::middleware::login_rate_limiter;
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Days covered by the dashboard and analytics pages.
pub const REPORT_DAYS: i32 = 30;

/// Logged-in admin, for the layout header.
#[derive(Debug, Clone)]
pub struct AdminView {
    pub name: String,
    pub email: String,
}

impl From<&CurrentAdmin> for AdminView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            name: admin.name.clone(),
            email: admin.email.to_string(),
        }
    }
}

/// Amount formatted the way the back-office shows money.
#[must_use]
pub fn format_money(cents: i64, currency: Currency) -> String {
    Price::new(cents, currency).format(Locale::Fr)
}

/// Timestamp in the back-office format, `2024-03-12 14:05`.
#[must_use]
pub fn format_timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Create the `/admin` router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(login_rate_limiter())),
        )
        .route("/logout", post(auth::logout))
        .route("/", get(dashboard::dashboard))
        .route("/recipes", get(recipes::index))
        .route("/recipes/{id}/publish", post(recipes::publish))
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/analytics", get(analytics::index))
        .route("/subscribers.csv", get(subscribers::export))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(123_450, Currency::Cad), "1234,50 $");
    }

    #[test]
    fn test_format_timestamp() {
        let at = chrono::Utc
            .with_ymd_and_hms(2024, 3, 12, 14, 5, 0)
            .single()
            .unwrap_or_default();
        assert_eq!(format_timestamp(at), "2024-03-12 14:05");
    }
}
