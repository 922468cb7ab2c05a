use std::error::Error;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::{Course, CourseAttributes};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Course not found.")]
    NotFound,

    #[error("A course with this ID already exists.")]
    Duplicate,

    #[error(transparent)]
    Datastore(#[from] Box<dyn Error + Send + Sync>),
}

/// Read and write access to the descriptive part of the course catalog.
///
/// Seat counts are returned as part of a `Course` but are never written through this trait after creation; see
/// [`crate::seat_ledger::SeatLedger`].
#[async_trait]
pub trait CourseCatalog: Send + Sync {
    async fn create_course(&self, course: &Course) -> Result<(), CatalogError>;

    async fn get_course(&self, course_id: &Uuid) -> Result<Course, CatalogError>;

    /// All courses, newest first.
    async fn list_courses(&self) -> Result<Vec<Course>, CatalogError>;

    /// Courses taught by the given instructor, newest first.
    async fn list_courses_for_instructor(&self, instructor_id: &Uuid) -> Result<Vec<Course>, CatalogError>;

    async fn update_course(&self, course_id: &Uuid, attributes: &CourseAttributes) -> Result<(), CatalogError>;

    async fn delete_course(&self, course_id: &Uuid) -> Result<(), CatalogError>;
}

pub(crate) fn newest_first(courses: &mut [Course]) {
    courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
