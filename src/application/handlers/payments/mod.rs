//! Payment webhook and refund handlers.

mod event_handlers;
mod process_webhook;
mod refund_order;

pub use event_handlers::{
    ChargeRefundedHandler, CheckoutCompletedHandler, PaymentFailedHandler, PaymentSucceededHandler,
};
pub use process_webhook::{
    CheckoutWebhookDispatcher, ProcessStripeWebhookCommand, ProcessStripeWebhookHandler,
};
pub use refund_order::{RefundOrderCommand, RefundOrderHandler, RefundOrderResult};
