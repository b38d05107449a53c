//! PostgreSQL implementation of CourseReader.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{CourseId, DomainError, Money};
use crate::ports::{CourseReader, CourseSummary};

/// PostgreSQL implementation of the CourseReader port.
pub struct PostgresCourseReader {
    pool: PgPool,
}

impl PostgresCourseReader {
    /// Creates a new reader over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a course, as checkout sees it.
#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    price_cents: i64,
    currency: String,
    status: String,
    lessons_total: i32,
}

impl TryFrom<CourseRow> for CourseSummary {
    type Error = DomainError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        let price = Money::new(row.price_cents, row.currency)
            .map_err(|e| DomainError::database(format!("Invalid stored price: {}", e)))?;

        Ok(CourseSummary {
            id: CourseId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            price,
            published: row.status == "published",
            lessons_total: row.lessons_total.max(0) as u32,
        })
    }
}

#[async_trait]
impl CourseReader for PostgresCourseReader {
    async fn find(&self, id: &CourseId) -> Result<Option<CourseSummary>, DomainError> {
        let row: Option<CourseRow> = sqlx::query_as(
            r#"
            SELECT c.id, c.title, c.description, c.price_cents, c.currency, c.status,
                   (SELECT COUNT(*) FROM lessons l WHERE l.course_id = c.id)::INT AS lessons_total
            FROM courses c
            WHERE c.id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find course: {}", e)))?;

        row.map(CourseSummary::try_from).transpose()
    }
}
