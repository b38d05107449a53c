//! PostgreSQL implementation of OrderRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::checkout::{Order, OrderStatus};
use crate::domain::foundation::{
    CourseId, DomainError, ErrorCode, Money, OrderId, Timestamp, UserId,
};
use crate::ports::OrderRepository;

/// PostgreSQL implementation of the OrderRepository port.
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new repository over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an order.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    course_id: Uuid,
    amount_cents: i64,
    currency: String,
    status: String,
    checkout_session_id: String,
    payment_intent_id: Option<String>,
    failure_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::parse(&row.status).ok_or_else(|| {
            DomainError::database(format!("Invalid order status value: {}", row.status))
        })?;
        let amount = Money::new(row.amount_cents, row.currency)
            .map_err(|e| DomainError::database(format!("Invalid stored amount: {}", e)))?;

        Ok(Order {
            id: OrderId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            course_id: CourseId::from_uuid(row.course_id),
            amount,
            status,
            checkout_session_id: row.checkout_session_id,
            payment_intent_id: row.payment_intent_id,
            failure_reason: row.failure_reason,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

const SELECT_COLUMNS: &str = "id, user_id, course_id, amount_cents, currency, status, \
     checkout_session_id, payment_intent_id, failure_reason, created_at, updated_at";

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, course_id, amount_cents, currency, status,
                checkout_session_id, payment_intent_id, failure_reason,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(order.course_id.as_uuid())
        .bind(order.amount.amount_cents())
        .bind(order.amount.currency())
        .bind(order.status.as_str())
        .bind(&order.checkout_session_id)
        .bind(&order.payment_intent_id)
        .bind(&order.failure_reason)
        .bind(order.created_at.as_datetime())
        .bind(order.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to create order: {}", e)))?;

        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = $2,
                payment_intent_id = $3,
                failure_reason = $4,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.status.as_str())
        .bind(&order.payment_intent_id)
        .bind(&order.failure_reason)
        .bind(order.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update order: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::OrderNotFound, "Order not found"));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find order: {}", e)))?;

        row.map(Order::try_from).transpose()
    }

    async fn find_by_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Order>, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders WHERE checkout_session_id = $1",
            SELECT_COLUMNS
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find order: {}", e)))?;

        row.map(Order::try_from).transpose()
    }

    async fn find_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Order>, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders WHERE payment_intent_id = $1",
            SELECT_COLUMNS
        ))
        .bind(payment_intent_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find order: {}", e)))?;

        row.map(Order::try_from).transpose()
    }

    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, DomainError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders WHERE status = $1 ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find orders: {}", e)))?;

        rows.into_iter().map(Order::try_from).collect()
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, DomainError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list orders: {}", e)))?;

        rows.into_iter().map(Order::try_from).collect()
    }

    async fn revenue_between(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<i64, DomainError> {
        let total: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(amount_cents)::BIGINT
            FROM orders
            WHERE status = 'paid' AND created_at >= $1 AND created_at <= $2
            "#,
        )
        .bind(start.as_datetime())
        .bind(end.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to aggregate revenue: {}", e)))?;

        Ok(total.unwrap_or(0))
    }
}
