//! Back-office dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use menucochon_core::Currency;

use crate::db::{AnalyticsRepository, OrderRepository, PostRepository, RecipeRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{Order, PageCount};
use crate::routes::admin::{AdminView, REPORT_DAYS, format_money, format_timestamp};
use crate::state::AppState;

const RECENT_ORDERS: i64 = 5;
const TOP_PAGES: i64 = 5;

/// Headline numbers.
#[derive(Debug, Clone)]
pub struct DashboardMetrics {
    pub published_recipes: i64,
    pub total_recipes: i64,
    pub published_posts: i64,
    pub orders: i64,
    pub revenue: String,
    pub refunded: String,
}

/// Order row for the back-office tables.
#[derive(Debug, Clone)]
pub struct OrderRow {
    pub id: i32,
    pub href: String,
    pub customer: String,
    pub total: String,
    pub status: &'static str,
    pub created_at: String,
}

impl OrderRow {
    #[must_use]
    pub fn new(order: &Order, default_currency: Currency) -> Self {
        let currency = Currency::parse(&order.currency).unwrap_or(default_currency);
        Self {
            id: order.id.as_i32(),
            href: format!("/admin/orders/{}", order.id),
            customer: order
                .customer_name
                .clone()
                .or_else(|| order.email.clone())
                .unwrap_or_else(|| "Invité".to_string()),
            total: format_money(order.amount_total_cents, currency),
            status: order.status.as_str(),
            created_at: format_timestamp(order.created_at),
        }
    }
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub admin: AdminView,
    pub current_path: &'static str,
    pub days: i32,
    pub metrics: DashboardMetrics,
    pub orders: Vec<OrderRow>,
    pub top_pages: Vec<PageCount>,
}

/// Dashboard page handler.
///
/// # Errors
///
/// Returns an error if any of the counts cannot be loaded.
#[instrument(skip_all)]
pub async fn dashboard(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let pool = state.pool();
    let currency = state.config().stripe.currency;

    let (published_recipes, total_recipes) = RecipeRepository::new(pool).counts().await?;
    let published_posts = PostRepository::new(pool).count_published().await?;
    let orders = OrderRepository::new(pool);
    let revenue = orders.revenue_summary(REPORT_DAYS).await?;
    let recent = orders
        .list_recent(RECENT_ORDERS)
        .await?
        .iter()
        .map(|o| OrderRow::new(o, currency))
        .collect();
    let top_pages = AnalyticsRepository::new(pool)
        .top_pages(REPORT_DAYS, TOP_PAGES)
        .await?;

    Ok(DashboardTemplate {
        admin: AdminView::from(&admin),
        current_path: "/admin",
        days: REPORT_DAYS,
        metrics: DashboardMetrics {
            published_recipes,
            total_recipes,
            published_posts,
            orders: revenue.orders,
            revenue: format_money(revenue.revenue_cents, currency),
            refunded: format_money(revenue.refunded_cents, currency),
        },
        orders: recent,
        top_pages,
    })
}
