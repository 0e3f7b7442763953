//! Back-office orders.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use menucochon_core::{Currency, OrderId};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::admin::dashboard::OrderRow;
use crate::routes::admin::{AdminView, format_money};
use crate::state::AppState;

const ORDERS_SHOWN: i64 = 100;

/// Line on the order detail page.
#[derive(Debug, Clone)]
pub struct ItemRow {
    pub name: String,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
}

/// Order list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders.html")]
pub struct OrdersTemplate {
    pub admin: AdminView,
    pub current_path: &'static str,
    pub orders: Vec<OrderRow>,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/order.html")]
pub struct OrderTemplate {
    pub admin: AdminView,
    pub current_path: &'static str,
    pub order: OrderRow,
    pub email: Option<String>,
    pub locale: &'static str,
    pub stripe_session_id: String,
    pub stripe_payment_intent: Option<String>,
    pub items: Vec<ItemRow>,
}

/// Most recent orders.
///
/// # Errors
///
/// Returns an error if the orders cannot be loaded.
#[instrument(skip_all)]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let currency = state.config().stripe.currency;
    let orders = OrderRepository::new(state.pool())
        .list_recent(ORDERS_SHOWN)
        .await?;

    Ok(OrdersTemplate {
        admin: AdminView::from(&admin),
        current_path: "/admin/orders",
        orders: orders.iter().map(|o| OrderRow::new(o, currency)).collect(),
    })
}

/// One order with its lines.
///
/// # Errors
///
/// Returns 404 for an unknown order.
#[instrument(skip(admin, state))]
pub async fn show(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response> {
    let Some((order, items)) = OrderRepository::new(state.pool())
        .get_with_items(OrderId::new(id))
        .await?
    else {
        return Err(AppError::NotFound(format!("order {id}")));
    };

    let currency = Currency::parse(&order.currency).unwrap_or(state.config().stripe.currency);
    let items = items
        .iter()
        .map(|item| ItemRow {
            name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: format_money(item.unit_price_cents, currency),
            line_total: format_money(item.line_total_cents(), currency),
        })
        .collect();

    Ok(OrderTemplate {
        admin: AdminView::from(&admin),
        current_path: "/admin/orders",
        order: OrderRow::new(&order, currency),
        email: order.email.clone(),
        locale: order.locale.code(),
        stripe_session_id: order.stripe_session_id.clone(),
        stripe_payment_intent: order.stripe_payment_intent.clone(),
        items,
    }
    .into_response())
}
