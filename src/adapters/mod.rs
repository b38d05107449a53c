//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `events` - In-memory event bus
//! - `http` - Axum routers, DTOs, and error mapping
//! - `postgres` - sqlx repositories
//! - `stripe` - Payment provider API client

pub mod events;
pub mod http;
pub mod postgres;
pub mod stripe;
