//! Stripe Checkout integration.
//!
//! - [`StripeClient`] creates hosted checkout sessions.
//! - [`verify_webhook`] authenticates `Stripe-Signature` headers.
//! - [`Event`] decodes the webhook events the shop reacts to.

mod client;
mod error;
mod types;
mod webhook;

pub use client::{CheckoutLine, CheckoutRequest, StripeClient};
pub use error::{StripeError, WebhookError};
pub use types::{Charge, CheckoutSession, CheckoutSessionCreated, CustomerDetails, Event, EventKind};
pub use webhook::{DEFAULT_TOLERANCE_SECS, sign_payload, verify_webhook};
