//! Checkout domain - purchase orders and their lifecycle.
//!
//! An `Order` records one purchase attempt for a course and moves through
//! the pending/paid/failed/refunded lifecycle only in response to external
//! payment confirmation, never on client assertion.

mod errors;
mod events;
mod order;
mod order_status;

pub use errors::CheckoutError;
pub use events::OrderEvent;
pub use order::Order;
pub use order_status::OrderStatus;
