//! Aggregated analytics rows for the back-office.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

/// Views per path.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PageCount {
    pub path: String,
    pub views: i64,
}

/// Views per calendar day.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyViews {
    pub day: NaiveDate,
    pub views: i64,
}

/// Clicks per outbound affiliate link.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AffiliateCount {
    pub url: String,
    pub label: Option<String>,
    pub clicks: i64,
}
