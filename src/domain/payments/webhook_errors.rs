//! Webhook error types for Stripe webhook handling.
//!
//! Defines all error conditions that can occur during webhook processing,
//! with HTTP status code mapping and retryability semantics.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Webhook timestamp is outside the acceptable window (5 minutes).
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse webhook payload or signature header.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required field missing from webhook payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Attempted order state transition is not valid.
    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    /// Event was intentionally ignored (not an error condition).
    ///
    /// Covers unrecognized event types and lookup misses: an event for
    /// an unknown order or payment intent is logged and acknowledged,
    /// never retried.
    #[error("Event ignored: {0}")]
    Ignored(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Returns true if Stripe should retry delivering this webhook.
    ///
    /// Only transient infrastructure failures are retryable; lookup
    /// misses are terminal no-ops.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Database(_))
    }

    /// Maps the error to an appropriate HTTP status code.
    ///
    /// Status codes determine Stripe's retry behavior:
    /// - 2xx: Event acknowledged, no retry
    /// - 4xx: Client error, no retry
    /// - 5xx: Server error, will retry
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Auth failures - don't retry
            WebhookError::InvalidSignature | WebhookError::TimestampOutOfRange => {
                StatusCode::UNAUTHORIZED
            }

            // Bad request - don't retry
            WebhookError::InvalidTimestamp
            | WebhookError::ParseError(_)
            | WebhookError::MissingField(_) => StatusCode::BAD_REQUEST,

            // Ignored events are acknowledged as success
            WebhookError::Ignored(_) => StatusCode::OK,

            // Contradictory transition - acknowledged record, no retry
            WebhookError::InvalidTransition(_) => StatusCode::CONFLICT,

            // Server errors - will retry
            WebhookError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // Error Display Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn invalid_signature_displays_correctly() {
        assert_eq!(
            format!("{}", WebhookError::InvalidSignature),
            "Invalid signature"
        );
    }

    #[test]
    fn parse_error_displays_message() {
        let err = WebhookError::ParseError("invalid JSON".to_string());
        assert_eq!(format!("{}", err), "Parse error: invalid JSON");
    }

    #[test]
    fn ignored_displays_reason() {
        let err = WebhookError::Ignored("no order for session cs_1".to_string());
        assert_eq!(format!("{}", err), "Event ignored: no order for session cs_1");
    }

    // ══════════════════════════════════════════════════════════════
    // Retryability Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn database_error_is_retryable() {
        assert!(WebhookError::Database("connection failed".to_string()).is_retryable());
    }

    #[test]
    fn lookup_miss_is_not_retryable() {
        assert!(!WebhookError::Ignored("no order".to_string()).is_retryable());
    }

    #[test]
    fn signature_failures_are_not_retryable() {
        assert!(!WebhookError::InvalidSignature.is_retryable());
        assert!(!WebhookError::TimestampOutOfRange.is_retryable());
    }

    #[test]
    fn parse_error_is_not_retryable() {
        assert!(!WebhookError::ParseError("bad json".to_string()).is_retryable());
    }

    // ══════════════════════════════════════════════════════════════
    // Status Code Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn invalid_signature_returns_unauthorized() {
        assert_eq!(
            WebhookError::InvalidSignature.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn timestamp_out_of_range_returns_unauthorized() {
        assert_eq!(
            WebhookError::TimestampOutOfRange.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn invalid_timestamp_returns_bad_request() {
        assert_eq!(
            WebhookError::InvalidTimestamp.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn parse_error_returns_bad_request() {
        assert_eq!(
            WebhookError::ParseError("syntax".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn missing_field_returns_bad_request() {
        assert_eq!(
            WebhookError::MissingField("payment_intent").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn ignored_returns_ok() {
        // Acknowledged so the provider stops retrying
        assert_eq!(
            WebhookError::Ignored("unknown event".to_string()).status_code(),
            StatusCode::OK
        );
    }

    #[test]
    fn invalid_transition_returns_conflict() {
        assert_eq!(
            WebhookError::InvalidTransition("paid -> failed".to_string()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn database_error_returns_internal_error() {
        assert_eq!(
            WebhookError::Database("lost".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
