//! Stripe objects, reduced to the fields the shop reads.

use std::collections::HashMap;

use serde::Deserialize;

use super::WebhookError;

/// Response of `POST /v1/checkout/sessions`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionCreated {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A checkout session as delivered in `checkout.session.completed`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub payment_status: String,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    /// Whether Stripe has captured the payment.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }

    /// Buyer email, preferring what the customer typed at checkout.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.customer_details
            .as_ref()
            .and_then(|d| d.email.as_deref())
            .or(self.customer_email.as_deref())
    }

    #[must_use]
    pub fn customer_name(&self) -> Option<&str> {
        self.customer_details.as_ref().and_then(|d| d.name.as_deref())
    }
}

/// A charge as delivered in `charge.refunded`.
#[derive(Debug, Clone, Deserialize)]
pub struct Charge {
    pub id: String,
    #[serde(default)]
    pub payment_intent: Option<String>,
    pub amount: i64,
    #[serde(default)]
    pub amount_refunded: i64,
    #[serde(default)]
    pub refunded: bool,
}

impl Charge {
    /// Whether the whole amount has been refunded.
    #[must_use]
    pub const fn is_full_refund(&self) -> bool {
        self.refunded || self.amount_refunded >= self.amount
    }
}

/// The events the shop handles.
#[derive(Debug, Clone)]
pub enum EventKind {
    CheckoutCompleted(Box<CheckoutSession>),
    ChargeRefunded(Charge),
    /// Any other event type; acknowledged and ignored.
    Other(String),
}

/// A decoded webhook event.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: String,
    pub kind: EventKind,
}

#[derive(Deserialize)]
struct RawEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: RawEventData,
}

#[derive(Deserialize)]
struct RawEventData {
    object: serde_json::Value,
}

impl Event {
    /// Decode a verified webhook payload.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::InvalidPayload` if the envelope or the object
    /// of a handled event type does not decode.
    pub fn parse(payload: &str) -> Result<Self, WebhookError> {
        let raw: RawEvent = serde_json::from_str(payload)
            .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;

        let kind = match raw.event_type.as_str() {
            "checkout.session.completed" => {
                let session: CheckoutSession = serde_json::from_value(raw.data.object)
                    .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;
                EventKind::CheckoutCompleted(Box::new(session))
            }
            "charge.refunded" => {
                let charge: Charge = serde_json::from_value(raw.data.object)
                    .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;
                EventKind::ChargeRefunded(charge)
            }
            _ => EventKind::Other(raw.event_type),
        };

        Ok(Self { id: raw.id, kind })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_checkout_completed() {
        let payload = r#"{
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": {"object": {
                "id": "cs_test_1",
                "payment_status": "paid",
                "payment_intent": "pi_1",
                "amount_total": 2598,
                "currency": "cad",
                "customer_details": {"email": "a@b.ca", "name": "Ana"},
                "metadata": {"cart": "[]", "locale": "fr"}
            }}
        }"#;
        let event = Event::parse(payload).unwrap();
        assert_eq!(event.id, "evt_1");
        let EventKind::CheckoutCompleted(session) = event.kind else {
            panic!("expected checkout event");
        };
        assert!(session.is_paid());
        assert_eq!(session.email(), Some("a@b.ca"));
        assert_eq!(session.metadata.get("locale").map(String::as_str), Some("fr"));
    }

    #[test]
    fn test_parse_refund_and_other() {
        let refund = r#"{"id":"evt_2","type":"charge.refunded","data":{"object":
            {"id":"ch_1","payment_intent":"pi_1","amount":1000,"amount_refunded":400,"refunded":false}}}"#;
        let EventKind::ChargeRefunded(charge) = Event::parse(refund).unwrap().kind else {
            panic!("expected refund event");
        };
        assert!(!charge.is_full_refund());

        let other = r#"{"id":"evt_3","type":"customer.created","data":{"object":{}}}"#;
        assert!(matches!(
            Event::parse(other).unwrap().kind,
            EventKind::Other(t) if t == "customer.created"
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Event::parse("not json").is_err());
        let bad = r#"{"id":"evt","type":"charge.refunded","data":{"object":{"id":"ch"}}}"#;
        assert!(Event::parse(bad).is_err());
    }
}
