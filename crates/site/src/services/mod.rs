//! Business logic services.
//!
//! - `auth` - back-office login (Argon2id passwords)
//! - `checkout` - cart validation and Stripe Checkout sessions
//! - `fulfillment` - Stripe webhook events to orders and refunds

pub mod auth;
pub mod checkout;
pub mod fulfillment;

pub use auth::{AuthError, AuthService};
pub use checkout::{CartLine, CheckoutError, CheckoutInput, PreparedCheckout, build_checkout, start_checkout};
pub use fulfillment::{FulfillmentError, FulfillmentOutcome, handle_event};
