//! ListOrdersHandler - Query handler for a user's order history.

use std::sync::Arc;

use crate::domain::checkout::{CheckoutError, Order};
use crate::domain::foundation::UserId;
use crate::ports::OrderRepository;

/// Query for a user's orders.
#[derive(Debug, Clone)]
pub struct ListOrdersQuery {
    pub user_id: UserId,
}

/// Handler returning a user's orders, newest first.
pub struct ListOrdersHandler {
    orders: Arc<dyn OrderRepository>,
}

impl ListOrdersHandler {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    pub async fn handle(&self, query: ListOrdersQuery) -> Result<Vec<Order>, CheckoutError> {
        Ok(self.orders.list_for_user(&query.user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::checkout::test_support::{pending_order, InMemoryOrders};
    use crate::domain::foundation::CourseId;

    #[tokio::test]
    async fn returns_only_the_users_orders() {
        let mine = pending_order(CourseId::new(), 1000);
        let theirs = pending_order(CourseId::new(), 3000);
        let orders = Arc::new(InMemoryOrders::with_order(mine.clone()));
        orders.create(&theirs).await.unwrap();

        let handler = ListOrdersHandler::new(orders);
        let result = handler
            .handle(ListOrdersQuery {
                user_id: mine.user_id,
            })
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, mine.id);
    }

    #[tokio::test]
    async fn empty_history_is_ok() {
        let handler = ListOrdersHandler::new(Arc::new(InMemoryOrders::new()));
        let result = handler
            .handle(ListOrdersQuery {
                user_id: crate::domain::foundation::UserId::new(),
            })
            .await
            .unwrap();
        assert!(result.is_empty());
    }
}
