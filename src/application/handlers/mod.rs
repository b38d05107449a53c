//! Command and query handlers.
//!
//! - `checkout` - Checkout initiation, success-redirect reconciliation,
//!   order listing, and the shared paid-order settlement routine
//! - `payments` - Webhook processing and refund creation

pub mod checkout;
pub mod payments;
