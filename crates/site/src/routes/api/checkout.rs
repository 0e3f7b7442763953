//! Start a Stripe Checkout session from the browser cart.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::error::{ApiError, add_breadcrumb};
use crate::routes::api::ApiJson;
use crate::services::{CheckoutInput, start_checkout};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

/// Validate the cart and return the Stripe-hosted checkout URL.
///
/// # Errors
///
/// Returns 400 for an invalid cart, 404 for an unknown product and 502 if
/// Stripe is unreachable.
#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CheckoutInput>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let lines = input.items.len().to_string();
    let url = start_checkout(&state, input).await?;
    add_breadcrumb("checkout", "Checkout session created", Some(&[("lines", &lines)]));
    Ok(Json(CheckoutResponse { url }))
}
