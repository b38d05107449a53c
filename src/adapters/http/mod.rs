//! HTTP adapters - Axum routers, DTOs, and error mapping.

pub mod checkout;

pub use checkout::{api_router, CheckoutAppState};
