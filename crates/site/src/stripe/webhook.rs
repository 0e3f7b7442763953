//! `Stripe-Signature` verification.
//!
//! The header looks like `t=1492774577,v1=5257a8...,v1=...`. The signed
//! payload is `"{t}.{body}"`, HMAC-SHA256 with the endpoint secret, hex encoded.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::WebhookError;

/// Maximum age of a signed timestamp, in seconds.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Verify a webhook payload against its `Stripe-Signature` header.
///
/// Any `v1` signature may match; other schemes are ignored.
///
/// # Errors
///
/// Returns a `WebhookError` describing why the request is not authentic.
pub fn verify_webhook(
    payload: &str,
    header: &str,
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), WebhookError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => {
                timestamp = Some(value.parse().map_err(|_| WebhookError::MalformedHeader)?);
            }
            "v1" => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(WebhookError::MalformedHeader);
    }

    if now.abs_diff(timestamp) > tolerance_secs.unsigned_abs() {
        return Err(WebhookError::StaleTimestamp);
    }

    let expected = sign_payload(payload, secret, timestamp);
    if signatures
        .iter()
        .any(|candidate| constant_time_compare(&expected, candidate))
    {
        Ok(())
    } else {
        Err(WebhookError::SignatureMismatch)
    }
}

/// Hex HMAC-SHA256 of `"{timestamp}.{payload}"`.
#[must_use]
pub fn sign_payload(payload: &str, secret: &str, timestamp: i64) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const BODY: &str = r#"{"id":"evt_1","type":"checkout.session.completed"}"#;
    const NOW: i64 = 1_700_000_000;

    fn header(ts: i64, sig: &str) -> String {
        format!("t={ts},v1={sig}")
    }

    #[test]
    fn test_valid_signature() {
        let sig = sign_payload(BODY, SECRET, NOW);
        assert_eq!(
            verify_webhook(BODY, &header(NOW, &sig), SECRET, NOW + 10, DEFAULT_TOLERANCE_SECS),
            Ok(())
        );
    }

    #[test]
    fn test_any_v1_may_match() {
        let sig = sign_payload(BODY, SECRET, NOW);
        let h = format!("t={NOW},v1={},v0=legacy,v1={sig}", "0".repeat(64));
        assert_eq!(verify_webhook(BODY, &h, SECRET, NOW, DEFAULT_TOLERANCE_SECS), Ok(()));
    }

    #[test]
    fn test_tampered_body() {
        let sig = sign_payload(BODY, SECRET, NOW);
        assert_eq!(
            verify_webhook("{}", &header(NOW, &sig), SECRET, NOW, DEFAULT_TOLERANCE_SECS),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn test_wrong_secret() {
        let sig = sign_payload(BODY, "whsec_other", NOW);
        assert_eq!(
            verify_webhook(BODY, &header(NOW, &sig), SECRET, NOW, DEFAULT_TOLERANCE_SECS),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn test_stale_timestamp() {
        let sig = sign_payload(BODY, SECRET, NOW);
        assert_eq!(
            verify_webhook(BODY, &header(NOW, &sig), SECRET, NOW + 301, DEFAULT_TOLERANCE_SECS),
            Err(WebhookError::StaleTimestamp)
        );
    }

    #[test]
    fn test_extreme_timestamps_are_stale() {
        for ts in [i64::MIN, i64::MAX, -1] {
            assert_eq!(
                verify_webhook(BODY, &header(ts, "00"), SECRET, NOW, DEFAULT_TOLERANCE_SECS),
                Err(WebhookError::StaleTimestamp),
                "timestamp {ts}"
            );
        }
    }

    #[test]
    fn test_malformed_headers() {
        for h in ["", "v1=abc", "t=abc,v1=def", "t=123", "garbage"] {
            assert_eq!(
                verify_webhook(BODY, h, SECRET, NOW, DEFAULT_TOLERANCE_SECS),
                Err(WebhookError::MalformedHeader),
                "header {h:?}"
            );
        }
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(!constant_time_compare("hello", "hell"));
        assert!(!constant_time_compare("hello", "world"));
    }
}
