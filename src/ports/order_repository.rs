//! OrderRepository port - Order persistence.
//!
//! Orders are looked up by internal id, by the provider's checkout
//! session id (checkout-completed events, success redirect), and by
//! payment intent id (payment and refund events).

use async_trait::async_trait;

use crate::domain::checkout::{Order, OrderStatus};
use crate::domain::foundation::{DomainError, OrderId, Timestamp, UserId};

/// Repository port for Order persistence.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order.
    async fn create(&self, order: &Order) -> Result<(), DomainError>;

    /// Update an existing order.
    ///
    /// # Errors
    ///
    /// - `OrderNotFound` if the order doesn't exist
    async fn update(&self, order: &Order) -> Result<(), DomainError>;

    /// Find an order by its ID.
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError>;

    /// Find an order by the provider's checkout session id.
    async fn find_by_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Order>, DomainError>;

    /// Find an order by the provider's payment intent id.
    async fn find_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Order>, DomainError>;

    /// Find all orders with the given status, newest first.
    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, DomainError>;

    /// Find a user's orders, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, DomainError>;

    /// Total paid revenue in minor currency units for orders created in
    /// the given range.
    async fn revenue_between(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<i64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn OrderRepository) {}
    }
}
