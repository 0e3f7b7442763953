//! Cart validation and Stripe Checkout session creation.
//!
//! Prices always come from the catalogue, never from the browser. The cart
//! the buyer sent is stored in the session metadata so the webhook can build
//! the order from the same lines.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use menucochon_core::{Currency, Email, Locale, ProductId};

use crate::db::{ProductRepository, RepositoryError};
use crate::i18n;
use crate::models::Product;
use crate::state::AppState;
use crate::stripe::{CheckoutLine, CheckoutRequest, StripeError};

/// Maximum number of distinct cart lines.
pub const MAX_LINES: usize = 20;
/// Maximum quantity of one product.
pub const MAX_QUANTITY: i32 = 10;

/// One cart line as sent by the browser and stored in Stripe metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Checkout request body.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutInput {
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub email: Option<String>,
}

/// Errors that can occur while starting a checkout.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("cart has more than {max} lines")]
    TooManyLines { max: usize },

    #[error("quantity {quantity} for product {product_id} is outside 1-{MAX_QUANTITY}")]
    InvalidQuantity { product_id: ProductId, quantity: i32 },

    #[error("unknown product {0}")]
    UnknownProduct(ProductId),

    #[error("product {0} is not for sale")]
    Unavailable(ProductId),

    #[error("only {available} left of product {product_id}")]
    InsufficientStock { product_id: ProductId, available: i32 },

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] menucochon_core::EmailError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("stripe error: {0}")]
    Stripe(#[from] StripeError),

    #[error("metadata encoding failed: {0}")]
    Metadata(String),
}

/// Validated cart, priced from the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCheckout {
    pub lines: Vec<CheckoutLine>,
    /// Merged cart, in first-seen order.
    pub cart: Vec<CartLine>,
    pub total_cents: i64,
}

/// Validate line count and quantities, merging duplicate products.
///
/// # Errors
///
/// Returns `EmptyCart`, `TooManyLines` or `InvalidQuantity`.
pub fn merge_lines(cart: &[CartLine]) -> Result<Vec<CartLine>, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    if cart.len() > MAX_LINES {
        return Err(CheckoutError::TooManyLines { max: MAX_LINES });
    }

    let mut merged: Vec<CartLine> = Vec::with_capacity(cart.len());
    for line in cart {
        if !(1..=MAX_QUANTITY).contains(&line.quantity) {
            return Err(CheckoutError::InvalidQuantity {
                product_id: line.product_id,
                quantity: line.quantity,
            });
        }
        match merged.iter_mut().find(|m| m.product_id == line.product_id) {
            Some(existing) => existing.quantity += line.quantity,
            None => merged.push(*line),
        }
    }

    if let Some(line) = merged.iter().find(|l| l.quantity > MAX_QUANTITY) {
        return Err(CheckoutError::InvalidQuantity {
            product_id: line.product_id,
            quantity: line.quantity,
        });
    }

    Ok(merged)
}

/// Price a cart against the catalogue.
///
/// # Errors
///
/// Returns a `CheckoutError` if the cart is invalid or a product is unknown,
/// inactive or short on stock.
pub fn build_checkout(
    products: &[Product],
    cart: &[CartLine],
    locale: Locale,
) -> Result<PreparedCheckout, CheckoutError> {
    let merged = merge_lines(cart)?;
    let by_id: HashMap<ProductId, &Product> = products.iter().map(|p| (p.id, p)).collect();

    let mut lines = Vec::with_capacity(merged.len());
    let mut total_cents: i64 = 0;

    for line in &merged {
        let product = by_id
            .get(&line.product_id)
            .ok_or(CheckoutError::UnknownProduct(line.product_id))?;

        if !product.active {
            return Err(CheckoutError::Unavailable(product.id));
        }
        if product.stock < line.quantity {
            return Err(CheckoutError::InsufficientStock {
                product_id: product.id,
                available: product.stock,
            });
        }

        total_cents = total_cents.saturating_add(
            product
                .price_cents
                .saturating_mul(i64::from(line.quantity)),
        );
        lines.push(CheckoutLine {
            name: product.name(locale).to_string(),
            unit_amount_cents: product.price_cents,
            quantity: line.quantity,
            image_url: product.image_url.clone(),
        });
    }

    Ok(PreparedCheckout {
        lines,
        cart: merged,
        total_cents,
    })
}

/// Validate the cart, open a Stripe Checkout session and return its URL.
///
/// # Errors
///
/// Returns a `CheckoutError` for invalid carts, database or Stripe failures.
#[instrument(skip(state, input), fields(lines = input.items.len(), locale = %input.locale))]
pub async fn start_checkout(state: &AppState, input: CheckoutInput) -> Result<String, CheckoutError> {
    let customer_email = input
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(Email::normalize)
        .transpose()?;

    let merged = merge_lines(&input.items)?;
    let ids: Vec<ProductId> = merged.iter().map(|l| l.product_id).collect();
    let products = ProductRepository::new(state.pool()).get_many(&ids).await?;

    let prepared = build_checkout(&products, &merged, input.locale)?;
    let cart_metadata =
        serde_json::to_string(&prepared.cart).map_err(|e| CheckoutError::Metadata(e.to_string()))?;

    let config = state.config();
    let request = CheckoutRequest {
        currency: config.stripe.currency,
        locale: input.locale,
        lines: prepared.lines,
        success_url: format!(
            "{}?session_id={{CHECKOUT_SESSION_ID}}",
            config.absolute_url(&i18n::checkout_success_path(input.locale))
        ),
        cancel_url: format!(
            "{}?checkout=cancelled",
            config.absolute_url(&i18n::shop_path(input.locale))
        ),
        customer_email: customer_email.map(Email::into_inner),
        cart_metadata,
    };

    let session = state.stripe().create_checkout_session(&request).await?;
    info!(
        session_id = %session.id,
        total_cents = prepared.total_cents,
        currency = Currency::code(config.stripe.currency),
        "Checkout started"
    );
    Ok(session.url)
}
