//! Checkout HTTP module - routes, handlers, and DTOs.

mod dto;
mod handlers;
mod routes;

pub use handlers::{AuthenticatedUser, CheckoutAppState};
pub use routes::{api_router, checkout_routes, orders_routes, webhook_routes};
