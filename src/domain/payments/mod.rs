//! Payments domain - webhook events, verification, and idempotent processing.
//!
//! Webhooks from the payment provider are the authoritative source of
//! order state transitions. This module owns:
//!
//! - the parsed webhook event types (`StripeEvent`, payload objects)
//! - signature verification (`StripeWebhookVerifier`)
//! - the error taxonomy with HTTP/retry semantics (`WebhookError`)
//! - exactly-once processing (`IdempotentWebhookProcessor`)

mod stripe_event;
mod webhook_errors;
mod webhook_processor;
mod webhook_verifier;

pub use stripe_event::{
    ChargePayload, CheckoutSessionPayload, PaymentErrorDetail, PaymentIntentPayload, StripeEvent,
    StripeEventData, StripeEventType,
};
pub use webhook_errors::WebhookError;
pub use webhook_processor::{IdempotentWebhookProcessor, WebhookDispatcher, WebhookEventHandler};
pub use webhook_verifier::{SignatureHeader, StripeWebhookVerifier};

#[cfg(test)]
pub use stripe_event::StripeEventBuilder;
#[cfg(test)]
pub use webhook_verifier::compute_test_signature;
