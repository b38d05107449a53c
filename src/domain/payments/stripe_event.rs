//! Stripe webhook event types.
//!
//! Defines the structures for parsing Stripe webhook payloads.
//! Only fields relevant to our processing are captured.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Stripe webhook event (simplified).
///
/// Contains the essential fields needed for webhook processing.
/// Additional fields from Stripe's full event schema are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    pub created: i64,

    /// Object containing event-specific data.
    pub data: StripeEventData,

    /// Whether this is a live mode event (vs test mode).
    pub livemode: bool,

    /// API version used to render this event.
    pub api_version: String,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object that triggered the event (polymorphic based on event type).
    pub object: serde_json::Value,

    /// Previous values for updated attributes (only for update events).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_attributes: Option<serde_json::Value>,
}

impl StripeEvent {
    /// Parse the event type into a known enum variant.
    pub fn parsed_type(&self) -> StripeEventType {
        StripeEventType::from_str(&self.event_type)
    }

    /// Attempts to deserialize the data object as the specified type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }
}

/// Known Stripe event types that we handle.
///
/// A closed set with an explicit `Unknown` branch; dispatch is a match
/// over this enum rather than open-ended string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StripeEventType {
    /// Checkout session completed successfully.
    CheckoutSessionCompleted,
    /// Payment intent succeeded.
    PaymentIntentSucceeded,
    /// Payment intent failed.
    PaymentIntentFailed,
    /// Charge was refunded.
    ChargeRefunded,
    /// Unknown or unhandled event type.
    Unknown,
}

impl StripeEventType {
    /// Parse event type from string.
    pub fn from_str(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "payment_intent.succeeded" => Self::PaymentIntentSucceeded,
            "payment_intent.payment_failed" => Self::PaymentIntentFailed,
            "charge.refunded" => Self::ChargeRefunded,
            _ => Self::Unknown,
        }
    }

    /// Convert to the Stripe event type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckoutSessionCompleted => "checkout.session.completed",
            Self::PaymentIntentSucceeded => "payment_intent.succeeded",
            Self::PaymentIntentFailed => "payment_intent.payment_failed",
            Self::ChargeRefunded => "charge.refunded",
            Self::Unknown => "unknown",
        }
    }
}

/// Checkout session object carried by `checkout.session.completed`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckoutSessionPayload {
    /// Session id (cs_xxx format).
    pub id: String,

    /// Payment intent created for this session.
    #[serde(default)]
    pub payment_intent: Option<String>,

    /// Payment status reported by the provider ("paid", "unpaid", ...).
    #[serde(default)]
    pub payment_status: Option<String>,

    /// Metadata attached at session creation (user_id, course_id).
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Payment intent object carried by `payment_intent.*` events.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentIntentPayload {
    /// Payment intent id (pi_xxx format).
    pub id: String,

    /// Error detail on the most recent failed attempt.
    #[serde(default)]
    pub last_payment_error: Option<PaymentErrorDetail>,
}

/// Error detail nested under a failed payment intent.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
}

impl PaymentIntentPayload {
    /// Provider-reported failure reason, with the conventional fallback.
    pub fn failure_reason(&self) -> String {
        self.last_payment_error
            .as_ref()
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| "Payment failed".to_string())
    }
}

/// Charge object carried by `charge.refunded`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChargePayload {
    /// Charge id (ch_xxx format).
    pub id: String,

    /// Payment intent this charge belongs to.
    #[serde(default)]
    pub payment_intent: Option<String>,
}

/// Builder for creating test StripeEvent instances.
#[cfg(test)]
pub struct StripeEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
    livemode: bool,
    api_version: String,
}

#[cfg(test)]
impl Default for StripeEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "checkout.session.completed".to_string(),
            created: 1_704_067_200,
            object: serde_json::json!({}),
            livemode: false,
            api_version: "2023-10-16".to_string(),
        }
    }
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn livemode(mut self, livemode: bool) -> Self {
        self.livemode = livemode;
        self
    }

    pub fn build(self) -> StripeEvent {
        StripeEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: StripeEventData {
                object: self.object,
                previous_attributes: None,
            },
            livemode: self.livemode,
            api_version: self.api_version,
        }
    }
}
