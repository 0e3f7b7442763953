//! Order repository.
//!
//! Orders are written only by the Stripe webhook. Creation and refunds run
//! in a transaction so stock and order state never drift apart.

use sqlx::PgPool;
use tracing::{info, instrument, warn};

use menucochon_core::{OrderId, OrderStatus};

use super::RepositoryError;
use crate::models::{NewOrder, Order, OrderItem, RevenueSummary};

const ORDER_COLUMNS: &str = "id, stripe_session_id, stripe_payment_intent, email, customer_name, \
     amount_total_cents, currency, locale, status, created_at, updated_at";

/// Outcome of marking an order refunded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundResult {
    /// Status changed and stock returned.
    Refunded(OrderId),
    /// The order was already refunded or cancelled; nothing changed.
    AlreadyRefunded(OrderId),
    /// No order carries this payment intent.
    NotFound,
}

/// Repository for shop orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a paid order with its items and decrement stock.
    ///
    /// Returns `None` when an order for this Stripe session already exists.
    /// Stock is clamped at zero: Stripe has already taken the money, so an
    /// oversell is recorded rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if an item references an unknown product.
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self, order), fields(session_id = %order.stripe_session_id))]
    pub async fn create_from_checkout(
        &self,
        order: &NewOrder,
    ) -> Result<Option<OrderId>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let inserted: Option<(OrderId,)> = sqlx::query_as(
            r"
            INSERT INTO orders (stripe_session_id, stripe_payment_intent, email, customer_name,
                                amount_total_cents, currency, locale, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'paid')
            ON CONFLICT (stripe_session_id) DO NOTHING
            RETURNING id
            ",
        )
        .bind(&order.stripe_session_id)
        .bind(order.stripe_payment_intent.as_deref())
        .bind(order.email.as_deref())
        .bind(order.customer_name.as_deref())
        .bind(order.amount_total_cents)
        .bind(&order.currency)
        .bind(order.locale)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((order_id,)) = inserted else {
            tx.rollback().await?;
            return Ok(None);
        };

        for item in &order.items {
            let product: Option<(String, i64, i32)> = sqlx::query_as(
                "SELECT name_fr, price_cents, stock FROM products WHERE id = $1 FOR UPDATE",
            )
            .bind(item.product_id)
            .fetch_optional(&mut *tx)
            .await?;

            let Some((name, price_cents, stock)) = product else {
                warn!(product_id = %item.product_id, "Order references unknown product");
                return Err(RepositoryError::NotFound);
            };

            if stock < item.quantity {
                warn!(
                    product_id = %item.product_id,
                    stock,
                    quantity = item.quantity,
                    "Oversold product"
                );
            }

            sqlx::query(
                r"
                INSERT INTO order_items (order_id, product_id, product_name, quantity, unit_price_cents)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(&name)
            .bind(item.quantity)
            .bind(price_cents)
            .execute(&mut *tx)
            .await?;

            sqlx::query("UPDATE products SET stock = GREATEST(stock - $2, 0) WHERE id = $1")
                .bind(item.product_id)
                .bind(item.quantity)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!(order_id = %order_id, items = order.items.len(), "Order created");
        Ok(Some(order_id))
    }

    /// Mark the order paid by this payment intent refunded and restock its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn mark_refunded(&self, payment_intent: &str) -> Result<RefundResult, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(OrderId, OrderStatus)> = sqlx::query_as(
            "SELECT id, status FROM orders WHERE stripe_payment_intent = $1 FOR UPDATE",
        )
        .bind(payment_intent)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((order_id, status)) = row else {
            tx.rollback().await?;
            return Ok(RefundResult::NotFound);
        };

        if status.is_restocked() {
            tx.rollback().await?;
            return Ok(RefundResult::AlreadyRefunded(order_id));
        }

        sqlx::query("UPDATE orders SET status = 'refunded', updated_at = NOW() WHERE id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r"
            UPDATE products p
            SET stock = p.stock + oi.quantity
            FROM order_items oi
            WHERE oi.order_id = $1 AND p.id = oi.product_id
            ",
        )
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(order_id = %order_id, "Order refunded and restocked");
        Ok(RefundResult::Refunded(order_id))
    }

    /// Most recent orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// An order and its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_with_items(
        &self,
        id: OrderId,
    ) -> Result<Option<(Order, Vec<OrderItem>)>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT product_id, product_name, quantity, unit_price_cents
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some((order, items)))
    }

    /// Order count, revenue and refunded amount over the last `days` days.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn revenue_summary(&self, days: i32) -> Result<RevenueSummary, RepositoryError> {
        let summary = sqlx::query_as::<_, RevenueSummary>(
            r"
            SELECT COUNT(*) FILTER (WHERE status IN ('paid', 'fulfilled')) AS orders,
                   COALESCE(SUM(amount_total_cents)
                       FILTER (WHERE status IN ('paid', 'fulfilled')), 0)::BIGINT AS revenue_cents,
                   COALESCE(SUM(amount_total_cents)
                       FILTER (WHERE status = 'refunded'), 0)::BIGINT AS refunded_cents
            FROM orders
            WHERE created_at >= NOW() - make_interval(days => $1)
            ",
        )
        .bind(days)
        .fetch_one(self.pool)
        .await?;
        Ok(summary)
    }
}
