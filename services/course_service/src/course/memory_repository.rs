use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::repository::newest_first;
use super::{CatalogError, Course, CourseAttributes, CourseCatalog};
use crate::seat_ledger::{apply_delta, SeatLedger, SeatLedgerError};

/// In-process course table, serving both as catalog and as seat ledger.
///
/// Clones share the same table. Each ledger adjustment runs under the table lock, which gives it the same
/// all-or-nothing read-modify-write semantics as the conditional update of the DynamoDB ledger.
#[derive(Clone, Default)]
pub struct InMemoryCourses {
    courses: Arc<Mutex<HashMap<Uuid, Course>>>,
}

impl InMemoryCourses {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseCatalog for InMemoryCourses {
    async fn create_course(&self, course: &Course) -> Result<(), CatalogError> {
        let mut courses = self.courses.lock().await;
        if courses.contains_key(&course.course_id) {
            return Err(CatalogError::Duplicate);
        }
        courses.insert(course.course_id, course.clone());
        Ok(())
    }

    async fn get_course(&self, course_id: &Uuid) -> Result<Course, CatalogError> {
        self.courses
            .lock()
            .await
            .get(course_id)
            .cloned()
            .ok_or(CatalogError::NotFound)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, CatalogError> {
        let mut courses: Vec<Course> = self.courses.lock().await.values().cloned().collect();
        newest_first(&mut courses);
        Ok(courses)
    }

    async fn list_courses_for_instructor(&self, instructor_id: &Uuid) -> Result<Vec<Course>, CatalogError> {
        let mut courses: Vec<Course> = self
            .courses
            .lock()
            .await
            .values()
            .filter(|course| course.is_owned_by(instructor_id))
            .cloned()
            .collect();
        newest_first(&mut courses);
        Ok(courses)
    }

    async fn update_course(&self, course_id: &Uuid, attributes: &CourseAttributes) -> Result<(), CatalogError> {
        let mut courses = self.courses.lock().await;
        let course = courses.get_mut(course_id).ok_or(CatalogError::NotFound)?;
        course.attributes = attributes.clone();
        Ok(())
    }

    async fn delete_course(&self, course_id: &Uuid) -> Result<(), CatalogError> {
        self.courses
            .lock()
            .await
            .remove(course_id)
            .map(|_| ())
            .ok_or(CatalogError::NotFound)
    }
}

#[async_trait]
impl SeatLedger for InMemoryCourses {
    async fn seats(&self, course_id: &Uuid) -> Result<u32, SeatLedgerError> {
        self.courses
            .lock()
            .await
            .get(course_id)
            .map(|course| course.seats_remaining)
            .ok_or(SeatLedgerError::NotFound)
    }

    async fn adjust_seats(&self, course_id: &Uuid, delta: i32) -> Result<u32, SeatLedgerError> {
        let mut courses = self.courses.lock().await;
        let course = courses.get_mut(course_id).ok_or(SeatLedgerError::NotFound)?;
        let remaining = course.seats_remaining;
        course.seats_remaining = apply_delta(remaining, delta).ok_or(SeatLedgerError::Capacity { remaining, delta })?;
        Ok(course.seats_remaining)
    }
}
