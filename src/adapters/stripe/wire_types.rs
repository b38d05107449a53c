//! Response shapes for the Stripe API endpoints the adapter calls.
//!
//! Only the fields we consume are declared; everything else in Stripe's
//! responses is ignored.

use serde::Deserialize;

/// Checkout session as returned by `/v1/checkout/sessions`.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCheckoutSessionResponse {
    pub id: String,

    /// Redirect URL; null once the session is complete or expired.
    #[serde(default)]
    pub url: Option<String>,

    /// "paid", "unpaid", or "no_payment_required".
    #[serde(default)]
    pub payment_status: Option<String>,

    /// Payment intent id, present once payment starts.
    #[serde(default)]
    pub payment_intent: Option<String>,

    #[serde(default)]
    pub expires_at: Option<i64>,
}

/// Refund as returned by `/v1/refunds`.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeRefundResponse {
    pub id: String,

    /// "pending", "succeeded", "failed", ...
    #[serde(default)]
    pub status: Option<String>,
}

/// Error envelope returned by the Stripe API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorResponse {
    pub error: StripeErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorDetail {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}
