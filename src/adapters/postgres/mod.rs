//! PostgreSQL adapters.
//!
//! sqlx-backed implementations of the persistence ports. Repositories
//! lean on database constraints for the invariants that matter under
//! concurrency: the unique index on enrollments (student_id, course_id)
//! and the primary key on webhook_events (event_id).

mod course_reader;
mod enrollment_repository;
mod order_repository;
mod webhook_event_repository;

pub use course_reader::PostgresCourseReader;
pub use enrollment_repository::PostgresEnrollmentRepository;
pub use order_repository::PostgresOrderRepository;
pub use webhook_event_repository::PostgresWebhookEventRepository;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;

/// Creates a connection pool from configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.url)
        .await
}
