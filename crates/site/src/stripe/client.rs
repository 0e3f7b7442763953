//! Stripe REST client.
//!
//! Stripe takes form-encoded bodies with bracketed keys
//! (`line_items[0][price_data][currency]=cad`) and answers JSON.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, error, instrument};

use menucochon_core::{Currency, Locale};

use super::error::StripeError;
use super::types::CheckoutSessionCreated;
use crate::config::StripeConfig;

/// Stripe API base URL.
const STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Countries shipping addresses are collected for.
const SHIPPING_COUNTRIES: [&str; 2] = ["CA", "US"];

/// One line of a checkout session, priced inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLine {
    pub name: String,
    pub unit_amount_cents: i64,
    pub quantity: i32,
    pub image_url: Option<String>,
}

/// Everything needed to open a hosted checkout page.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub currency: Currency,
    pub locale: Locale,
    pub lines: Vec<CheckoutLine>,
    pub success_url: String,
    pub cancel_url: String,
    pub customer_email: Option<String>,
    /// JSON of `[{product_id, quantity}]`, read back by the webhook.
    pub cart_metadata: String,
}

impl CheckoutRequest {
    /// Form fields in Stripe's bracket notation.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = vec![
            ("mode".into(), "payment".into()),
            ("success_url".into(), self.success_url.clone()),
            ("cancel_url".into(), self.cancel_url.clone()),
            ("locale".into(), self.locale.code().into()),
            ("metadata[cart]".into(), self.cart_metadata.clone()),
            ("metadata[locale]".into(), self.locale.code().into()),
        ];

        for (i, country) in SHIPPING_COUNTRIES.iter().enumerate() {
            fields.push((
                format!("shipping_address_collection[allowed_countries][{i}]"),
                (*country).to_string(),
            ));
        }

        if let Some(email) = &self.customer_email {
            fields.push(("customer_email".into(), email.clone()));
        }

        for (i, line) in self.lines.iter().enumerate() {
            let prefix = format!("line_items[{i}]");
            fields.push((format!("{prefix}[quantity]"), line.quantity.to_string()));
            fields.push((
                format!("{prefix}[price_data][currency]"),
                self.currency.code().to_string(),
            ));
            fields.push((
                format!("{prefix}[price_data][unit_amount]"),
                line.unit_amount_cents.to_string(),
            ));
            fields.push((
                format!("{prefix}[price_data][product_data][name]"),
                line.name.clone(),
            ));
            if let Some(image) = &line.image_url {
                fields.push((
                    format!("{prefix}[price_data][product_data][images][0]"),
                    image.clone(),
                ));
            }
        }

        fields
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: SecretString,
    api_base: String,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("secret_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl StripeClient {
    /// Create a client for the live Stripe API.
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self::with_base_url(config.secret_key.clone(), STRIPE_API_BASE)
    }

    /// Create a client against another base URL (stripe-mock, tests).
    #[must_use]
    pub fn with_base_url(secret_key: SecretString, api_base: &str) -> Self {
        Self {
            client: Client::new(),
            secret_key,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Create a hosted checkout session.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or Stripe rejects it.
    #[instrument(skip(self, request), fields(lines = request.lines.len()))]
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSessionCreated, StripeError> {
        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(self.secret_key.expose_secret())
            .form(&request.form_fields())
            .send()
            .await
            .map_err(|e| StripeError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            error!(status = status.as_u16(), %message, "Stripe API error creating session");
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: CheckoutSessionCreated = response
            .json()
            .await
            .map_err(|e| StripeError::Response(e.to_string()))?;

        debug!(session_id = %session.id, "Checkout session created");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            currency: Currency::Cad,
            locale: Locale::Fr,
            lines: vec![
                CheckoutLine {
                    name: "Livre de recettes".into(),
                    unit_amount_cents: 2999,
                    quantity: 2,
                    image_url: Some("https://cdn.example.com/livre.webp".into()),
                },
                CheckoutLine {
                    name: "Tablier".into(),
                    unit_amount_cents: 1500,
                    quantity: 1,
                    image_url: None,
                },
            ],
            success_url: "https://www.menucochon.com/boutique/merci?session_id={CHECKOUT_SESSION_ID}"
                .into(),
            cancel_url: "https://www.menucochon.com/boutique".into(),
            customer_email: None,
            cart_metadata: r#"[{"product_id":1,"quantity":2}]"#.into(),
        }
    }

    fn field<'a>(fields: &'a [(String, String)], key: &str) -> Option<&'a str> {
        fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_form_fields_lines() {
        let fields = request().form_fields();
        assert_eq!(field(&fields, "mode"), Some("payment"));
        assert_eq!(field(&fields, "line_items[0][quantity]"), Some("2"));
        assert_eq!(field(&fields, "line_items[0][price_data][unit_amount]"), Some("2999"));
        assert_eq!(field(&fields, "line_items[1][price_data][currency]"), Some("cad"));
        assert_eq!(
            field(&fields, "line_items[1][price_data][product_data][name]"),
            Some("Tablier")
        );
        assert_eq!(field(&fields, "line_items[1][price_data][product_data][images][0]"), None);
        assert_eq!(
            field(&fields, "shipping_address_collection[allowed_countries][1]"),
            Some("US")
        );
        assert_eq!(field(&fields, "metadata[locale]"), Some("fr"));
        assert_eq!(field(&fields, "customer_email"), None);
    }

    #[test]
    fn test_client_debug_redacts_key() {
        let client = StripeClient::with_base_url(SecretString::from("sk_test_abc"), "http://x/");
        let debug = format!("{client:?}");
        assert!(!debug.contains("sk_test_abc"));
        assert!(debug.contains("http://x"));
    }
}
