//! Stripe payment provider adapter.
//!
//! - `stripe_adapter` - `PaymentProvider` implementation over the Stripe
//!   HTTP API (checkout sessions, refunds)
//! - `wire_types` - response shapes for the Stripe API endpoints we call
//!
//! Webhook signature verification lives in the domain layer
//! (`domain::payments::StripeWebhookVerifier`); this adapter only makes
//! outbound API calls.

mod stripe_adapter;
mod wire_types;

pub use stripe_adapter::{StripeCheckoutAdapter, StripeConfig};
