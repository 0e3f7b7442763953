//! Back-office analytics: page views and affiliate clicks.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::db::AnalyticsRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{AffiliateCount, DailyViews, PageCount};
use crate::routes::admin::{AdminView, REPORT_DAYS};
use crate::state::AppState;

const TOP_LIMIT: i64 = 25;

/// One bar of the daily views chart.
#[derive(Debug, Clone)]
pub struct DayBar {
    pub day: String,
    pub views: i64,
    /// Bar width in percent of the busiest day.
    pub width: i64,
}

/// Scale daily counts against the busiest day.
#[must_use]
pub fn day_bars(days: &[DailyViews]) -> Vec<DayBar> {
    let max = days.iter().map(|d| d.views).max().unwrap_or(0).max(1);
    days.iter()
        .map(|d| DayBar {
            day: d.day.format("%m-%d").to_string(),
            views: d.views,
            width: d.views * 100 / max,
        })
        .collect()
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/analytics.html")]
pub struct AnalyticsTemplate {
    pub admin: AdminView,
    pub current_path: &'static str,
    pub days: i32,
    pub total_views: i64,
    pub daily: Vec<DayBar>,
    pub top_pages: Vec<PageCount>,
    pub affiliates: Vec<AffiliateCount>,
}

/// Analytics page handler.
///
/// # Errors
///
/// Returns an error if a report query fails.
#[instrument(skip_all)]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let analytics = AnalyticsRepository::new(state.pool());
    let daily = analytics.daily_views(REPORT_DAYS).await?;
    let top_pages = analytics.top_pages(REPORT_DAYS, TOP_LIMIT).await?;
    let affiliates = analytics.affiliate_summary(REPORT_DAYS, TOP_LIMIT).await?;

    Ok(AnalyticsTemplate {
        admin: AdminView::from(&admin),
        current_path: "/admin/analytics",
        days: REPORT_DAYS,
        total_views: daily.iter().map(|d| d.views).sum(),
        daily: day_bars(&daily),
        top_pages,
        affiliates,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_day_bars_scale_to_busiest_day() {
        let day = |d, views| DailyViews {
            day: NaiveDate::from_ymd_opt(2024, 3, d).unwrap_or_default(),
            views,
        };
        let bars = day_bars(&[day(1, 50), day(2, 200), day(3, 0)]);
        let widths: Vec<i64> = bars.iter().map(|b| b.width).collect();
        assert_eq!(widths, vec![25, 100, 0]);
        assert_eq!(bars.first().map(|b| b.day.as_str()), Some("03-01"));
    }

    #[test]
    fn test_day_bars_empty() {
        assert!(day_bars(&[]).is_empty());
    }
}
