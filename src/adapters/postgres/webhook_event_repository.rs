//! PostgreSQL implementation of WebhookEventRepository.
//!
//! The PRIMARY KEY on event_id makes concurrent deliveries of the same
//! event race on the insert; `ON CONFLICT DO NOTHING` lets the loser
//! detect that it lost.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::DomainError;
use crate::ports::{SaveResult, WebhookEventRecord, WebhookEventRepository};

/// PostgreSQL implementation of the WebhookEventRepository port.
pub struct PostgresWebhookEventRepository {
    pool: PgPool,
}

impl PostgresWebhookEventRepository {
    /// Creates a new repository over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a processed webhook event.
///
/// The payload is stored as serialized JSON text.
#[derive(Debug, sqlx::FromRow)]
struct WebhookEventRow {
    event_id: String,
    event_type: String,
    processed_at: DateTime<Utc>,
    result: String,
    error_message: Option<String>,
    payload: String,
}

impl TryFrom<WebhookEventRow> for WebhookEventRecord {
    type Error = DomainError;

    fn try_from(row: WebhookEventRow) -> Result<Self, Self::Error> {
        let payload = serde_json::from_str(&row.payload)
            .map_err(|e| DomainError::database(format!("Invalid stored payload: {}", e)))?;

        Ok(WebhookEventRecord {
            event_id: row.event_id,
            event_type: row.event_type,
            processed_at: row.processed_at,
            result: row.result,
            error_message: row.error_message,
            payload,
        })
    }
}

#[async_trait]
impl WebhookEventRepository for PostgresWebhookEventRepository {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        let row: Option<WebhookEventRow> = sqlx::query_as(
            r#"
            SELECT event_id, event_type, processed_at, result, error_message, payload
            FROM webhook_events
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find webhook event: {}", e)))?;

        row.map(WebhookEventRecord::try_from).transpose()
    }

    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
        let payload = serde_json::to_string(&record.payload)
            .map_err(|e| DomainError::database(format!("Failed to serialize payload: {}", e)))?;

        let result = sqlx::query(
            r#"
            INSERT INTO webhook_events (
                event_id, event_type, processed_at, result, error_message, payload
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(&record.event_id)
        .bind(&record.event_type)
        .bind(record.processed_at)
        .bind(&record.result)
        .bind(&record.error_message)
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to save webhook event: {}", e)))?;

        if result.rows_affected() == 0 {
            Ok(SaveResult::AlreadyExists)
        } else {
            Ok(SaveResult::Inserted)
        }
    }

    async fn delete_before(&self, timestamp: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM webhook_events WHERE processed_at < $1")
            .bind(timestamp)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::database(format!("Failed to delete webhook events: {}", e))
            })?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_converts_to_record() {
        let row = WebhookEventRow {
            event_id: "evt_1".to_string(),
            event_type: "charge.refunded".to_string(),
            processed_at: Utc::now(),
            result: "success".to_string(),
            error_message: None,
            payload: r#"{"id":"evt_1"}"#.to_string(),
        };

        let record = WebhookEventRecord::try_from(row).unwrap();
        assert_eq!(record.event_id, "evt_1");
        assert_eq!(record.payload["id"], "evt_1");
    }

    #[test]
    fn row_with_corrupt_payload_is_rejected() {
        let row = WebhookEventRow {
            event_id: "evt_2".to_string(),
            event_type: "charge.refunded".to_string(),
            processed_at: Utc::now(),
            result: "success".to_string(),
            error_message: None,
            payload: "{not json".to_string(),
        };

        assert!(WebhookEventRecord::try_from(row).is_err());
    }
}
