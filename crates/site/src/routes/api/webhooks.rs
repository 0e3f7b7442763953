//! Stripe webhook endpoint.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::error::ApiError;
use crate::services::{FulfillmentOutcome, handle_event};
use crate::state::AppState;
use crate::stripe::{DEFAULT_TOLERANCE_SECS, Event, verify_webhook};

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Verify, decode and apply a Stripe event.
///
/// The raw body is verified before anything is parsed.
///
/// # Errors
///
/// Returns 400 for a missing or invalid signature or payload, and 500 when
/// the event cannot be applied, so Stripe retries it.
#[instrument(skip_all)]
pub async fn stripe(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::bad_request("Missing Stripe-Signature header"))?;
    let payload = std::str::from_utf8(&body)
        .map_err(|_| ApiError::bad_request("Payload is not UTF-8"))?;

    verify_webhook(
        payload,
        signature,
        state.config().stripe.webhook_secret.expose_secret(),
        chrono::Utc::now().timestamp(),
        DEFAULT_TOLERANCE_SECS,
    )
    .map_err(|e| {
        warn!(error = %e, "Rejected Stripe webhook");
        ApiError::bad_request(format!("Invalid signature: {e}"))
    })?;

    let event = Event::parse(payload).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let outcome = handle_event(state.pool(), &event).await?;

    match outcome {
        FulfillmentOutcome::OrderCreated(order_id) => info!(%order_id, "Order created"),
        FulfillmentOutcome::Refunded(order_id) => {
            info!(%order_id, "Order refunded and restocked");
        }
        FulfillmentOutcome::Duplicate
        | FulfillmentOutcome::UnknownOrder
        | FulfillmentOutcome::Ignored => {}
    }
    if matches!(
        outcome,
        FulfillmentOutcome::OrderCreated(_) | FulfillmentOutcome::Refunded(_)
    ) {
        state.invalidate_cache().await;
    }

    Ok(Json(json!({ "received": true })))
}
