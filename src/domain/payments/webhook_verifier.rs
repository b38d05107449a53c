//! Stripe webhook signature verification.
//!
//! Implements verification of Stripe webhook signatures using HMAC-SHA256
//! over `"{timestamp}.{payload}"` with constant-time comparison and a
//! bounded timestamp window to reject replays.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::stripe_event::StripeEvent;
use super::webhook_errors::WebhookError;

/// Maximum allowed age for webhook events (5 minutes).
const MAX_EVENT_AGE_SECS: i64 = 300;

/// Maximum allowed clock skew for future events (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Parsed components from the Stripe-Signature header.
///
/// Format: `t=<timestamp>,v1=<signature>[,v0=<legacy>]`. Unknown keys
/// are skipped for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp when the signature was generated.
    pub timestamp: i64,
    /// v1 signature (HMAC-SHA256).
    pub v1_signature: Vec<u8>,
}

impl SignatureHeader {
    /// Parses a Stripe-Signature header string.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::ParseError` if the header format is invalid
    /// or the required `t`/`v1` components are missing.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signature: Option<Vec<u8>> = None;

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or_else(|| WebhookError::ParseError("invalid header format".to_string()))?;

            match key {
                "t" => {
                    timestamp = Some(value.parse().map_err(|_| {
                        WebhookError::ParseError("invalid timestamp".to_string())
                    })?);
                }
                "v1" => {
                    v1_signature = Some(hex::decode(value).map_err(|_| {
                        WebhookError::ParseError("invalid v1 signature hex".to_string())
                    })?);
                }
                // v0 and future scheme keys are ignored
                _ => {}
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| WebhookError::ParseError("missing timestamp".to_string()))?;
        let v1_signature = v1_signature
            .ok_or_else(|| WebhookError::ParseError("missing v1 signature".to_string()))?;

        Ok(SignatureHeader {
            timestamp,
            v1_signature,
        })
    }
}

/// Verifier for Stripe webhook signatures.
pub struct StripeWebhookVerifier {
    /// The webhook signing secret from the Stripe dashboard.
    secret: String,
}

impl StripeWebhookVerifier {
    /// Creates a new verifier with the given webhook secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verifies the webhook signature and parses the event.
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` - Signature comparison failed
    /// - `TimestampOutOfRange` - Event is older than 5 minutes
    /// - `InvalidTimestamp` - Event timestamp is in the future
    /// - `ParseError` - Failed to parse header or JSON payload
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeEvent, WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        self.validate_timestamp(header.timestamp)?;

        let expected = self.compute_signature(header.timestamp, payload);
        if !constant_time_compare(&expected, &header.v1_signature) {
            return Err(WebhookError::InvalidSignature);
        }

        let event: StripeEvent = serde_json::from_slice(payload)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        Ok(event)
    }

    /// Validates that the timestamp is within acceptable bounds.
    fn validate_timestamp(&self, timestamp: i64) -> Result<(), WebhookError> {
        let now = chrono::Utc::now().timestamp();
        let age = now - timestamp;

        if age > MAX_EVENT_AGE_SECS {
            return Err(WebhookError::TimestampOutOfRange);
        }
        if age < -MAX_CLOCK_SKEW_SECS {
            return Err(WebhookError::InvalidTimestamp);
        }

        Ok(())
    }

    /// Computes the HMAC-SHA256 signature for the given timestamp and payload.
    fn compute_signature(&self, timestamp: i64, payload: &[u8]) -> Vec<u8> {
        let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));

        let mut mac =
            Hmac::<Sha256>::new_from_slice(self.secret.as_bytes()).expect("HMAC accepts any key");
        mac.update(signed_payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes HMAC-SHA256 for use in test fixtures.
#[cfg(test)]
pub fn compute_test_signature(secret: &str, timestamp: i64, payload: &str) -> String {
    let signed_payload = format!("{}.{}", timestamp, payload);
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key");
    mac.update(signed_payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEST_SECRET: &str = "whsec_test_secret_12345";

    // ══════════════════════════════════════════════════════════════
    // SignatureHeader Parsing Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parse_header_with_v1_only() {
        let signature = "a".repeat(64);
        let header_str = format!("t=1234567890,v1={}", signature);

        let header = SignatureHeader::parse(&header_str).unwrap();

        assert_eq!(header.timestamp, 1234567890);
        assert_eq!(header.v1_signature.len(), 32);
    }

    #[test]
    fn parse_header_ignores_v0_and_unknown_fields() {
        let signature = "a".repeat(64);
        let header_str = format!("t=1234567890,v1={},v0={},scheme=hmac", signature, "b".repeat(64));

        let header = SignatureHeader::parse(&header_str).unwrap();
        assert_eq!(header.timestamp, 1234567890);
    }

    #[test]
    fn parse_header_missing_timestamp_fails() {
        let header_str = format!("v1={}", "a".repeat(64));
        assert!(matches!(
            SignatureHeader::parse(&header_str),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn parse_header_missing_v1_fails() {
        assert!(matches!(
            SignatureHeader::parse("t=1234567890"),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn parse_header_invalid_timestamp_fails() {
        let header_str = format!("t=not_a_number,v1={}", "a".repeat(64));
        assert!(matches!(
            SignatureHeader::parse(&header_str),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn parse_header_invalid_hex_fails() {
        assert!(matches!(
            SignatureHeader::parse("t=1234567890,v1=not_valid_hex"),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn parse_header_no_equals_fails() {
        assert!(matches!(
            SignatureHeader::parse("t1234567890"),
            Err(WebhookError::ParseError(_))
        ));
    }

    // ══════════════════════════════════════════════════════════════
    // Signature Verification Tests
    // ══════════════════════════════════════════════════════════════

    fn valid_payload() -> String {
        r#"{"id":"evt_test123","type":"checkout.session.completed","created":1704067200,"data":{"object":{}},"livemode":false,"api_version":"2023-10-16"}"#
            .to_string()
    }

    #[test]
    fn verify_valid_signature() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let payload = valid_payload();
        let timestamp = chrono::Utc::now().timestamp();
        let signature = compute_test_signature(TEST_SECRET, timestamp, &payload);
        let header = format!("t={},v1={}", timestamp, signature);

        let event = verifier.verify_and_parse(payload.as_bytes(), &header).unwrap();
        assert_eq!(event.id, "evt_test123");
    }

    #[test]
    fn verify_invalid_signature_fails() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let timestamp = chrono::Utc::now().timestamp();
        let header = format!("t={},v1={}", timestamp, "a".repeat(64));

        let result = verifier.verify_and_parse(valid_payload().as_bytes(), &header);
        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_wrong_secret_fails() {
        let verifier = StripeWebhookVerifier::new("wrong_secret");
        let payload = valid_payload();
        let timestamp = chrono::Utc::now().timestamp();
        let signature = compute_test_signature(TEST_SECRET, timestamp, &payload);
        let header = format!("t={},v1={}", timestamp, signature);

        let result = verifier.verify_and_parse(payload.as_bytes(), &header);
        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_tampered_payload_fails() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let original = valid_payload();
        let tampered = original.replace("evt_test123", "evt_hacked");
        let timestamp = chrono::Utc::now().timestamp();
        let signature = compute_test_signature(TEST_SECRET, timestamp, &original);
        let header = format!("t={},v1={}", timestamp, signature);

        let result = verifier.verify_and_parse(tampered.as_bytes(), &header);
        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_invalid_json_fails_after_signature_passes() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let payload = "not valid json";
        let timestamp = chrono::Utc::now().timestamp();
        let signature = compute_test_signature(TEST_SECRET, timestamp, payload);
        let header = format!("t={},v1={}", timestamp, signature);

        let result = verifier.verify_and_parse(payload.as_bytes(), &header);
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    // ══════════════════════════════════════════════════════════════
    // Timestamp Validation Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn timestamp_within_window_succeeds() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let timestamp = chrono::Utc::now().timestamp() - 120;
        assert!(verifier.validate_timestamp(timestamp).is_ok());
    }

    #[test]
    fn timestamp_too_old_fails() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let timestamp = chrono::Utc::now().timestamp() - 600;
        assert!(matches!(
            verifier.validate_timestamp(timestamp),
            Err(WebhookError::TimestampOutOfRange)
        ));
    }

    #[test]
    fn timestamp_at_boundary_succeeds() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let timestamp = chrono::Utc::now().timestamp() - 300;
        assert!(verifier.validate_timestamp(timestamp).is_ok());
    }

    #[test]
    fn timestamp_from_future_within_skew_succeeds() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let timestamp = chrono::Utc::now().timestamp() + 30;
        assert!(verifier.validate_timestamp(timestamp).is_ok());
    }

    #[test]
    fn timestamp_from_future_beyond_skew_fails() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let timestamp = chrono::Utc::now().timestamp() + 120;
        assert!(matches!(
            verifier.validate_timestamp(timestamp),
            Err(WebhookError::InvalidTimestamp)
        ));
    }

    // ══════════════════════════════════════════════════════════════
    // Constant Time Comparison Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn constant_time_compare_basic_cases() {
        assert!(constant_time_compare(&[1, 2, 3], &[1, 2, 3]));
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 4]));
        assert!(!constant_time_compare(&[1, 2], &[1, 2, 3]));
        assert!(constant_time_compare(&[], &[]));
    }

    // ══════════════════════════════════════════════════════════════
    // Properties
    // ══════════════════════════════════════════════════════════════

    proptest! {
        /// A correctly signed payload always verifies, regardless of
        /// payload bytes or secret, when the payload parses as an event.
        #[test]
        fn correctly_signed_header_always_passes_signature_check(
            secret in "[a-zA-Z0-9_]{8,40}",
            event_id in "evt_[a-z0-9]{8,24}",
        ) {
            let payload = format!(
                r#"{{"id":"{}","type":"payment_intent.succeeded","created":1704067200,"data":{{"object":{{}}}},"livemode":false,"api_version":"2023-10-16"}}"#,
                event_id
            );
            let timestamp = chrono::Utc::now().timestamp();
            let signature = compute_test_signature(&secret, timestamp, &payload);
            let header = format!("t={},v1={}", timestamp, signature);

            let verifier = StripeWebhookVerifier::new(secret);
            let event = verifier.verify_and_parse(payload.as_bytes(), &header).unwrap();
            prop_assert_eq!(event.id, event_id);
        }

        /// Any single flipped byte in the signature fails verification.
        #[test]
        fn corrupted_signature_never_passes(flip_index in 0usize..32) {
            let payload = r#"{"id":"evt_p","type":"charge.refunded","created":1704067200,"data":{"object":{}},"livemode":false,"api_version":"2023-10-16"}"#;
            let timestamp = chrono::Utc::now().timestamp();
            let signature = compute_test_signature(TEST_SECRET, timestamp, payload);

            let mut bytes = hex::decode(&signature).unwrap();
            bytes[flip_index] ^= 0xff;
            let header = format!("t={},v1={}", timestamp, hex::encode(bytes));

            let verifier = StripeWebhookVerifier::new(TEST_SECRET);
            let result = verifier.verify_and_parse(payload.as_bytes(), &header);
            prop_assert!(matches!(result, Err(WebhookError::InvalidSignature)));
        }
    }
}
