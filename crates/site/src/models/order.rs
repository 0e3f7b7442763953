//! Shop orders created from paid Stripe checkouts.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use menucochon_core::{Locale, OrderId, OrderStatus, ProductId};

#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: OrderId,
    pub stripe_session_id: String,
    pub stripe_payment_intent: Option<String>,
    pub email: Option<String>,
    pub customer_name: Option<String>,
    pub amount_total_cents: i64,
    pub currency: String,
    pub locale: Locale,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

impl OrderItem {
    #[must_use]
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents.saturating_mul(i64::from(self.quantity))
    }
}

/// Order data extracted from a completed checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub stripe_session_id: String,
    pub stripe_payment_intent: Option<String>,
    pub email: Option<String>,
    pub customer_name: Option<String>,
    pub amount_total_cents: i64,
    pub currency: String,
    pub locale: Locale,
    pub items: Vec<NewOrderItem>,
}

/// One purchased line; name and price are resolved from the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Sales totals for the dashboard.
#[derive(Debug, Clone, Default, FromRow)]
pub struct RevenueSummary {
    pub orders: i64,
    pub revenue_cents: i64,
    pub refunded_cents: i64,
}
