//! Turns verified Stripe webhook events into orders and refunds.
//!
//! Stripe delivers events at least once, so every branch is idempotent:
//! a replayed checkout hits the unique session id, a replayed refund finds
//! the order already refunded.

use std::collections::HashMap;

use sqlx::PgPool;
use tracing::{info, instrument, warn};

use menucochon_core::{Locale, OrderId};

use super::checkout::{CartLine, MAX_LINES, MAX_QUANTITY};
use crate::db::{OrderRepository, RefundResult, RepositoryError};
use crate::models::{NewOrder, NewOrderItem};
use crate::stripe::{CheckoutSession, Event, EventKind};

/// What handling an event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FulfillmentOutcome {
    OrderCreated(OrderId),
    /// The event was already applied.
    Duplicate,
    Refunded(OrderId),
    /// A refund for a payment no order knows about.
    UnknownOrder,
    /// Event type or state the shop does not act on.
    Ignored,
}

/// Errors that can occur while applying an event.
#[derive(Debug, thiserror::Error)]
pub enum FulfillmentError {
    #[error("invalid session metadata: {0}")]
    InvalidMetadata(String),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Decode the `cart` metadata written at checkout.
///
/// # Errors
///
/// Returns `FulfillmentError::InvalidMetadata` if the cart is missing,
/// malformed, empty or out of bounds.
pub fn parse_cart_metadata(
    metadata: &HashMap<String, String>,
) -> Result<Vec<NewOrderItem>, FulfillmentError> {
    let raw = metadata
        .get("cart")
        .ok_or_else(|| FulfillmentError::InvalidMetadata("missing cart".to_string()))?;

    let lines: Vec<CartLine> = serde_json::from_str(raw)
        .map_err(|e| FulfillmentError::InvalidMetadata(e.to_string()))?;

    if lines.is_empty() || lines.len() > MAX_LINES {
        return Err(FulfillmentError::InvalidMetadata(format!(
            "cart has {} lines",
            lines.len()
        )));
    }

    lines
        .into_iter()
        .map(|line| {
            if (1..=MAX_QUANTITY).contains(&line.quantity) {
                Ok(NewOrderItem {
                    product_id: line.product_id,
                    quantity: line.quantity,
                })
            } else {
                Err(FulfillmentError::InvalidMetadata(format!(
                    "quantity {} for product {}",
                    line.quantity, line.product_id
                )))
            }
        })
        .collect()
}

/// Build the order for a paid checkout session.
///
/// # Errors
///
/// Returns `FulfillmentError::InvalidMetadata` if the cart metadata is unusable.
pub fn order_from_session(session: &CheckoutSession) -> Result<NewOrder, FulfillmentError> {
    let items = parse_cart_metadata(&session.metadata)?;
    let locale = session
        .metadata
        .get("locale")
        .and_then(|l| Locale::parse(l).ok())
        .unwrap_or_default();

    Ok(NewOrder {
        stripe_session_id: session.id.clone(),
        stripe_payment_intent: session.payment_intent.clone(),
        email: session.email().map(str::to_lowercase),
        customer_name: session.customer_name().map(ToString::to_string),
        amount_total_cents: session.amount_total.unwrap_or_default(),
        currency: session
            .currency
            .clone()
            .unwrap_or_else(|| "cad".to_string()),
        locale,
        items,
    })
}

/// Apply one verified webhook event.
///
/// # Errors
///
/// Returns a `FulfillmentError` when the event cannot be applied; the
/// webhook answers 500 so Stripe retries.
#[instrument(skip(pool, event), fields(event_id = %event.id))]
pub async fn handle_event(
    pool: &PgPool,
    event: &Event,
) -> Result<FulfillmentOutcome, FulfillmentError> {
    let orders = OrderRepository::new(pool);

    match &event.kind {
        EventKind::CheckoutCompleted(session) => {
            if !session.is_paid() {
                info!(
                    session_id = %session.id,
                    payment_status = %session.payment_status,
                    "Checkout completed without payment"
                );
                return Ok(FulfillmentOutcome::Ignored);
            }

            // Payment links and dashboard charges never carry a cart
            if !session.metadata.contains_key("cart") {
                warn!(session_id = %session.id, "Paid checkout without cart metadata");
                return Ok(FulfillmentOutcome::Ignored);
            }

            let order = order_from_session(session)?;
            match orders.create_from_checkout(&order).await? {
                Some(order_id) => Ok(FulfillmentOutcome::OrderCreated(order_id)),
                None => {
                    info!(session_id = %session.id, "Checkout already fulfilled");
                    Ok(FulfillmentOutcome::Duplicate)
                }
            }
        }
        EventKind::ChargeRefunded(charge) => {
            if !charge.is_full_refund() {
                warn!(
                    charge_id = %charge.id,
                    amount = charge.amount,
                    amount_refunded = charge.amount_refunded,
                    "Partial refund ignored"
                );
                return Ok(FulfillmentOutcome::Ignored);
            }

            let Some(payment_intent) = charge.payment_intent.as_deref() else {
                warn!(charge_id = %charge.id, "Refunded charge has no payment intent");
                return Ok(FulfillmentOutcome::UnknownOrder);
            };

            match orders.mark_refunded(payment_intent).await? {
                RefundResult::Refunded(order_id) => Ok(FulfillmentOutcome::Refunded(order_id)),
                RefundResult::AlreadyRefunded(_) => Ok(FulfillmentOutcome::Duplicate),
                RefundResult::NotFound => {
                    warn!(payment_intent, "Refund for unknown order");
                    Ok(FulfillmentOutcome::UnknownOrder)
                }
            }
        }
        EventKind::Other(event_type) => {
            info!(event_type = %event_type, "Ignoring Stripe event");
            Ok(FulfillmentOutcome::Ignored)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use sqlx::postgres::PgPoolOptions;

    fn session(metadata: &[(&str, &str)], payment_status: &str) -> CheckoutSession {
        CheckoutSession {
            id: "cs_test_1".to_string(),
            payment_status: payment_status.to_string(),
            payment_intent: Some("pi_1".to_string()),
            amount_total: Some(4498),
            currency: Some("cad".to_string()),
            customer_email: Some("Buyer@Example.com".to_string()),
            customer_details: None,
            metadata: metadata
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://localhost/menucochon_unused")
            .unwrap()
    }

    #[test]
    fn test_order_from_session() {
        let s = session(
            &[("cart", r#"[{"product_id":3,"quantity":2}]"#), ("locale", "en")],
            "paid",
        );
        let order = order_from_session(&s).unwrap();
        assert_eq!(order.stripe_session_id, "cs_test_1");
        assert_eq!(order.email.as_deref(), Some("buyer@example.com"));
        assert_eq!(order.locale, Locale::En);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.amount_total_cents, 4498);
    }

    #[test]
    fn test_parse_cart_metadata_rejects_bad_carts() {
        let meta = |cart: &str| HashMap::from([("cart".to_string(), cart.to_string())]);
        assert!(parse_cart_metadata(&HashMap::new()).is_err());
        assert!(parse_cart_metadata(&meta("nope")).is_err());
        assert!(parse_cart_metadata(&meta("[]")).is_err());
        assert!(parse_cart_metadata(&meta(r#"[{"product_id":1,"quantity":0}]"#)).is_err());
        assert!(parse_cart_metadata(&meta(r#"[{"product_id":1,"quantity":1}]"#)).is_ok());
    }

    #[tokio::test]
    async fn test_unpaid_checkout_is_ignored() {
        let event = Event {
            id: "evt_1".to_string(),
            kind: EventKind::CheckoutCompleted(Box::new(session(&[], "unpaid"))),
        };
        let outcome = handle_event(&lazy_pool(), &event).await.unwrap();
        assert_eq!(outcome, FulfillmentOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_other_events_and_partial_refunds_are_ignored() {
        let pool = lazy_pool();
        let other = Event {
            id: "evt_2".to_string(),
            kind: EventKind::Other("customer.created".to_string()),
        };
        assert_eq!(
            handle_event(&pool, &other).await.unwrap(),
            FulfillmentOutcome::Ignored
        );

        let partial = Event {
            id: "evt_3".to_string(),
            kind: EventKind::ChargeRefunded(crate::stripe::Charge {
                id: "ch_1".to_string(),
                payment_intent: Some("pi_1".to_string()),
                amount: 1000,
                amount_refunded: 300,
                refunded: false,
            }),
        };
        assert_eq!(
            handle_event(&pool, &partial).await.unwrap(),
            FulfillmentOutcome::Ignored
        );
    }

    #[tokio::test]
    async fn test_paid_checkout_without_cart_is_ignored() {
        let event = Event {
            id: "evt_4".to_string(),
            kind: EventKind::CheckoutCompleted(Box::new(session(&[("locale", "fr")], "paid"))),
        };
        let outcome = handle_event(&lazy_pool(), &event).await.unwrap();
        assert_eq!(outcome, FulfillmentOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_paid_checkout_with_bad_cart_fails_before_db() {
        let event = Event {
            id: "evt_5".to_string(),
            kind: EventKind::CheckoutCompleted(Box::new(session(&[("cart", "[]")], "paid"))),
        };
        assert!(matches!(
            handle_event(&lazy_pool(), &event).await,
            Err(FulfillmentError::InvalidMetadata(_))
        ));
    }
}
