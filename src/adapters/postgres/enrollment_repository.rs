//! PostgreSQL implementation of EnrollmentRepository.
//!
//! The unique index on (student_id, course_id) is the serialization
//! point for the webhook/redirect settlement race: `insert_if_absent`
//! issues `ON CONFLICT DO NOTHING` and reports which writer won.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::enrollment::{Enrollment, EnrollmentStatus};
use crate::domain::foundation::{
    CourseId, DomainError, EnrollmentId, ErrorCode, Percentage, Timestamp, UserId,
};
use crate::ports::{EnrollmentInsert, EnrollmentRepository};

/// PostgreSQL implementation of the EnrollmentRepository port.
pub struct PostgresEnrollmentRepository {
    pool: PgPool,
}

impl PostgresEnrollmentRepository {
    /// Creates a new repository over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an enrollment.
#[derive(Debug, sqlx::FromRow)]
struct EnrollmentRow {
    id: Uuid,
    student_id: Uuid,
    course_id: Uuid,
    status: String,
    enrolled_at: DateTime<Utc>,
    progress_pct: i16,
    lessons_completed: i32,
    lessons_total: i32,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EnrollmentRow> for Enrollment {
    type Error = DomainError;

    fn try_from(row: EnrollmentRow) -> Result<Self, Self::Error> {
        let status = EnrollmentStatus::parse(&row.status).ok_or_else(|| {
            DomainError::database(format!("Invalid enrollment status value: {}", row.status))
        })?;
        let progress = u8::try_from(row.progress_pct)
            .ok()
            .and_then(|p| Percentage::try_new(p).ok())
            .ok_or_else(|| {
                DomainError::database(format!("Invalid stored progress: {}", row.progress_pct))
            })?;

        Ok(Enrollment {
            id: EnrollmentId::from_uuid(row.id),
            student_id: UserId::from_uuid(row.student_id),
            course_id: CourseId::from_uuid(row.course_id),
            status,
            enrolled_at: Timestamp::from_datetime(row.enrolled_at),
            progress,
            lessons_completed: row.lessons_completed.max(0) as u32,
            lessons_total: row.lessons_total.max(0) as u32,
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

const SELECT_COLUMNS: &str = "id, student_id, course_id, status, enrolled_at, progress_pct, \
     lessons_completed, lessons_total, updated_at";

#[async_trait]
impl EnrollmentRepository for PostgresEnrollmentRepository {
    async fn insert_if_absent(
        &self,
        enrollment: &Enrollment,
    ) -> Result<EnrollmentInsert, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO enrollments (
                id, student_id, course_id, status, enrolled_at,
                progress_pct, lessons_completed, lessons_total, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (student_id, course_id) DO NOTHING
            "#,
        )
        .bind(enrollment.id.as_uuid())
        .bind(enrollment.student_id.as_uuid())
        .bind(enrollment.course_id.as_uuid())
        .bind(enrollment.status.as_str())
        .bind(enrollment.enrolled_at.as_datetime())
        .bind(i16::from(enrollment.progress.value()))
        .bind(enrollment.lessons_completed as i32)
        .bind(enrollment.lessons_total as i32)
        .bind(enrollment.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert enrollment: {}", e)))?;

        if result.rows_affected() == 0 {
            Ok(EnrollmentInsert::AlreadyEnrolled)
        } else {
            Ok(EnrollmentInsert::Inserted)
        }
    }

    async fn update(&self, enrollment: &Enrollment) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE enrollments SET
                status = $2,
                progress_pct = $3,
                lessons_completed = $4,
                lessons_total = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(enrollment.id.as_uuid())
        .bind(enrollment.status.as_str())
        .bind(i16::from(enrollment.progress.value()))
        .bind(enrollment.lessons_completed as i32)
        .bind(enrollment.lessons_total as i32)
        .bind(enrollment.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update enrollment: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::EnrollmentNotFound,
                "Enrollment not found",
            ));
        }

        Ok(())
    }

    async fn find_by_student_and_course(
        &self,
        student_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Enrollment>, DomainError> {
        let row: Option<EnrollmentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM enrollments WHERE student_id = $1 AND course_id = $2",
            SELECT_COLUMNS
        ))
        .bind(student_id.as_uuid())
        .bind(course_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find enrollment: {}", e)))?;

        row.map(Enrollment::try_from).transpose()
    }

    async fn is_enrolled(
        &self,
        student_id: &UserId,
        course_id: &CourseId,
    ) -> Result<bool, DomainError> {
        let exists: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM enrollments WHERE student_id = $1 AND course_id = $2",
        )
        .bind(student_id.as_uuid())
        .bind(course_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to check enrollment: {}", e)))?;

        Ok(exists.is_some())
    }
}
