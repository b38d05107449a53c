//! CourseReader port - Read access to the course catalog.
//!
//! Checkout only needs to know whether a course exists, whether it can be
//! purchased, and what it costs. Course authoring lives elsewhere in the
//! platform.

use async_trait::async_trait;

use crate::domain::foundation::{CourseId, DomainError, Money};

/// Read model for a purchasable course.
#[derive(Debug, Clone)]
pub struct CourseSummary {
    pub id: CourseId,
    pub title: String,
    pub description: Option<String>,
    pub price: Money,
    /// Only published courses can be purchased.
    pub published: bool,
    /// Lesson count, used to initialize enrollment progress counters.
    pub lessons_total: u32,
}

/// Port for reading courses during checkout.
#[async_trait]
pub trait CourseReader: Send + Sync {
    /// Find a course by its ID.
    ///
    /// Returns `None` if the course does not exist.
    async fn find(&self, id: &CourseId) -> Result<Option<CourseSummary>, DomainError>;
}
