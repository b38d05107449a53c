//! Payment provider port for external payment processing.
//!
//! Defines the contract for the hosted-checkout payment gateway (Stripe).
//! Implementations handle checkout session creation, session retrieval
//! for redirect reconciliation, and refund creation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CourseId, DomainError, Money, UserId};

/// Port for payment provider integrations.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a hosted checkout session for a one-time course purchase.
    ///
    /// Returns the session id and the URL the buyer is redirected to.
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<ProviderCheckoutSession, PaymentError>;

    /// Retrieve a checkout session by id.
    ///
    /// Used by the success redirect to re-verify payment status with the
    /// provider rather than trusting the browser.
    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<ProviderCheckoutSession>, PaymentError>;

    /// Create a refund against a payment intent.
    ///
    /// A `None` amount refunds the full charge.
    async fn create_refund(&self, request: RefundRequest) -> Result<Refund, PaymentError>;
}

/// Request to create a checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSessionRequest {
    /// Internal user ID (stored as session metadata).
    pub user_id: UserId,

    /// Internal course ID (stored as session metadata).
    pub course_id: CourseId,

    /// Course title shown on the hosted checkout page.
    pub course_title: String,

    /// Course description shown on the hosted checkout page.
    pub course_description: Option<String>,

    /// Price charged.
    pub amount: Money,

    /// URL to redirect after successful checkout.
    pub success_url: String,

    /// URL to redirect after cancelled checkout.
    pub cancel_url: String,
}

/// A hosted checkout session at the payment provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCheckoutSession {
    /// Provider's session ID (cs_xxx format).
    pub id: String,

    /// URL for the buyer to complete checkout. Absent on retrieval of
    /// an already-finished session.
    pub url: Option<String>,

    /// Payment status of the session.
    pub payment_status: SessionPaymentStatus,

    /// Payment intent created for the session, once known.
    pub payment_intent_id: Option<String>,

    /// When the session expires (Unix timestamp), if reported.
    pub expires_at: Option<i64>,
}

/// Payment status of a checkout session as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPaymentStatus {
    /// Payment completed.
    Paid,
    /// Payment not yet completed.
    Unpaid,
    /// Session requires no payment (zero-amount).
    NoPaymentRequired,
    /// Unknown status string from the provider.
    Unknown,
}

impl SessionPaymentStatus {
    /// Parse the provider's status string.
    pub fn parse(s: &str) -> Self {
        match s {
            "paid" => Self::Paid,
            "unpaid" => Self::Unpaid,
            "no_payment_required" => Self::NoPaymentRequired,
            _ => Self::Unknown,
        }
    }

    /// True when the session's payment is settled.
    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Paid | Self::NoPaymentRequired)
    }
}

/// Request to refund a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRequest {
    /// Payment intent to refund.
    pub payment_intent_id: String,

    /// Partial refund amount in minor units; `None` refunds in full.
    pub amount_cents: Option<i64>,
}

/// A refund created at the payment provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refund {
    /// Provider's refund ID (re_xxx format).
    pub id: String,

    /// Provider-reported refund status.
    pub status: String,
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message (logged, not exposed to clients).
    pub message: String,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentError {
    /// Create a new payment error.
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.is_retryable(),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    /// Create a not found error.
    pub fn not_found(resource: &str) -> Self {
        Self::new(PaymentErrorCode::NotFound, format!("{} not found", resource))
    }

    /// Create a provider API error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        use crate::domain::foundation::ErrorCode;
        DomainError::new(ErrorCode::ExternalServiceError, err.to_string())
    }
}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Resource not found.
    NotFound,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Provider API error.
    ProviderError,

    /// Unknown error.
    Unknown,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError | PaymentErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::ProviderError => "provider_error",
            PaymentErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}
