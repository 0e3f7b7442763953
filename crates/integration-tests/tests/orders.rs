//! Database-backed tests for orders, stock and webhook fulfillment.
//!
//! Each test runs against a fresh database with the site migrations applied.
//! They need a Postgres server:
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/postgres cargo test -p menucochon-integration-tests --test orders -- --ignored
//! ```

use std::collections::HashMap;

use sqlx::PgPool;

use menucochon_core::{Locale, OrderStatus, ProductId};
use menucochon_site::db::{OrderRepository, RefundResult, RepositoryError};
use menucochon_site::models::{NewOrder, NewOrderItem};
use menucochon_site::services::{FulfillmentOutcome, handle_event};
use menucochon_site::stripe::{Charge, CheckoutSession, Event, EventKind};

async fn insert_product(pool: &PgPool, slug: &str, stock: i32) -> ProductId {
    let (id,): (ProductId,) = sqlx::query_as(
        "INSERT INTO products (slug, name_fr, price_cents, stock) VALUES ($1, $2, 1500, $3) RETURNING id",
    )
    .bind(slug)
    .bind(format!("Produit {slug}"))
    .bind(stock)
    .fetch_one(pool)
    .await
    .expect("Product insert should succeed");
    id
}

async fn stock_of(pool: &PgPool, id: ProductId) -> i32 {
    let (stock,): (i32,) = sqlx::query_as("SELECT stock FROM products WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("Product should exist");
    stock
}

async fn order_count(pool: &PgPool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await
        .expect("Count should succeed");
    count
}

fn new_order(session_id: &str, payment_intent: &str, items: &[(ProductId, i32)]) -> NewOrder {
    NewOrder {
        stripe_session_id: session_id.to_string(),
        stripe_payment_intent: Some(payment_intent.to_string()),
        email: Some("client@example.com".to_string()),
        customer_name: Some("Marie Tremblay".to_string()),
        amount_total_cents: 3000,
        currency: "cad".to_string(),
        locale: Locale::Fr,
        items: items
            .iter()
            .map(|&(product_id, quantity)| NewOrderItem {
                product_id,
                quantity,
            })
            .collect(),
    }
}

fn checkout_event(event_id: &str, session_id: &str, product: ProductId, quantity: i32) -> Event {
    let cart = format!(r#"[{{"product_id":{product},"quantity":{quantity}}}]"#);
    Event {
        id: event_id.to_string(),
        kind: EventKind::CheckoutCompleted(Box::new(CheckoutSession {
            id: session_id.to_string(),
            payment_status: "paid".to_string(),
            payment_intent: Some(format!("pi_{session_id}")),
            amount_total: Some(3000),
            currency: Some("cad".to_string()),
            customer_email: Some("client@example.com".to_string()),
            customer_details: None,
            metadata: HashMap::from([
                ("cart".to_string(), cart),
                ("locale".to_string(), "en".to_string()),
            ]),
        })),
    }
}

fn refund_event(event_id: &str, payment_intent: &str) -> Event {
    Event {
        id: event_id.to_string(),
        kind: EventKind::ChargeRefunded(Charge {
            id: format!("ch_{event_id}"),
            payment_intent: Some(payment_intent.to_string()),
            amount: 3000,
            amount_refunded: 3000,
            refunded: true,
        }),
    }
}

// ============================================================================
// Repository
// ============================================================================

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires a Postgres server (DATABASE_URL)"]
async fn test_replayed_session_creates_one_order(pool: PgPool) {
    let product = insert_product(&pool, "sirop-erable", 10).await;
    let orders = OrderRepository::new(&pool);
    let order = new_order("cs_replay", "pi_replay", &[(product, 2)]);

    let first = orders
        .create_from_checkout(&order)
        .await
        .expect("First insert should succeed");
    assert!(first.is_some());

    let second = orders
        .create_from_checkout(&order)
        .await
        .expect("Replay should not error");
    assert_eq!(second, None);

    assert_eq!(order_count(&pool).await, 1);
    assert_eq!(stock_of(&pool, product).await, 8);
}

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires a Postgres server (DATABASE_URL)"]
async fn test_oversell_clamps_stock_at_zero(pool: PgPool) {
    let product = insert_product(&pool, "tablier", 1).await;
    let orders = OrderRepository::new(&pool);

    let order_id = orders
        .create_from_checkout(&new_order("cs_oversell", "pi_oversell", &[(product, 3)]))
        .await
        .expect("Oversold order should still be recorded")
        .expect("Order should be new");

    assert_eq!(stock_of(&pool, product).await, 0);

    let (order, items) = orders
        .get_with_items(order_id)
        .await
        .expect("Lookup should succeed")
        .expect("Order should exist");
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 3);
    assert_eq!(items[0].product_name, "Produit tablier");
}

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires a Postgres server (DATABASE_URL)"]
async fn test_refund_restocks_exactly_once(pool: PgPool) {
    let product = insert_product(&pool, "livre-recettes", 5).await;
    let orders = OrderRepository::new(&pool);
    let order_id = orders
        .create_from_checkout(&new_order("cs_refund", "pi_refund", &[(product, 2)]))
        .await
        .expect("Insert should succeed")
        .expect("Order should be new");
    assert_eq!(stock_of(&pool, product).await, 3);

    let first = orders
        .mark_refunded("pi_refund")
        .await
        .expect("Refund should succeed");
    assert_eq!(first, RefundResult::Refunded(order_id));
    assert_eq!(stock_of(&pool, product).await, 5);

    let second = orders
        .mark_refunded("pi_refund")
        .await
        .expect("Replayed refund should not error");
    assert_eq!(second, RefundResult::AlreadyRefunded(order_id));
    assert_eq!(stock_of(&pool, product).await, 5);

    let (order, _) = orders
        .get_with_items(order_id)
        .await
        .expect("Lookup should succeed")
        .expect("Order should exist");
    assert_eq!(order.status, OrderStatus::Refunded);
}

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires a Postgres server (DATABASE_URL)"]
async fn test_unknown_product_rolls_back_order(pool: PgPool) {
    let orders = OrderRepository::new(&pool);
    let result = orders
        .create_from_checkout(&new_order("cs_ghost", "pi_ghost", &[(ProductId::new(9999), 1)]))
        .await;

    assert!(matches!(result, Err(RepositoryError::NotFound)));
    assert_eq!(order_count(&pool).await, 0);
}

// ============================================================================
// Webhook Fulfillment
// ============================================================================

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires a Postgres server (DATABASE_URL)"]
async fn test_replayed_checkout_event_is_duplicate(pool: PgPool) {
    let product = insert_product(&pool, "epices-tourtiere", 4).await;
    let event = checkout_event("evt_checkout", "cs_event", product, 1);

    let first = handle_event(&pool, &event).await.expect("Event should apply");
    assert!(matches!(first, FulfillmentOutcome::OrderCreated(_)));

    let second = handle_event(&pool, &event).await.expect("Replay should not error");
    assert_eq!(second, FulfillmentOutcome::Duplicate);

    assert_eq!(order_count(&pool).await, 1);
    assert_eq!(stock_of(&pool, product).await, 3);
}

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires a Postgres server (DATABASE_URL)"]
async fn test_refund_event_then_replay(pool: PgPool) {
    let product = insert_product(&pool, "moule-tarte", 2).await;
    let created = handle_event(&pool, &checkout_event("evt_buy", "cs_buy", product, 2))
        .await
        .expect("Checkout should apply");
    let FulfillmentOutcome::OrderCreated(order_id) = created else {
        panic!("expected a new order, got {created:?}");
    };
    assert_eq!(stock_of(&pool, product).await, 0);

    let refund = refund_event("evt_refund", "pi_cs_buy");
    assert_eq!(
        handle_event(&pool, &refund).await.expect("Refund should apply"),
        FulfillmentOutcome::Refunded(order_id)
    );
    assert_eq!(
        handle_event(&pool, &refund).await.expect("Replay should not error"),
        FulfillmentOutcome::Duplicate
    );
    assert_eq!(stock_of(&pool, product).await, 2);

    assert_eq!(
        handle_event(&pool, &refund_event("evt_other", "pi_nobody"))
            .await
            .expect("Unknown refund should not error"),
        FulfillmentOutcome::UnknownOrder
    );
}
