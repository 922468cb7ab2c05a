use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Enrollment, EnrollmentStore, EnrollmentStoreError};

/// In-process enrollment store keyed by enrollment ID. Clones share the same records.
#[derive(Clone, Default)]
pub struct InMemoryEnrollments {
    enrollments: Arc<Mutex<HashMap<Uuid, Enrollment>>>,
}

impl InMemoryEnrollments {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EnrollmentStore for InMemoryEnrollments {
    async fn find_by_user_and_course(
        &self,
        user_id: &Uuid,
        course_id: &Uuid,
    ) -> Result<Option<Enrollment>, EnrollmentStoreError> {
        Ok(self
            .enrollments
            .lock()
            .await
            .values()
            .find(|e| &e.user_id == user_id && &e.course_id == course_id)
            .cloned())
    }

    async fn count_for_user(&self, user_id: &Uuid) -> Result<usize, EnrollmentStoreError> {
        Ok(self
            .enrollments
            .lock()
            .await
            .values()
            .filter(|e| &e.user_id == user_id)
            .count())
    }

    async fn create(&self, enrollment: Enrollment, max_enrollments: usize) -> Result<Enrollment, EnrollmentStoreError> {
        let mut enrollments = self.enrollments.lock().await;
        let held: Vec<&Enrollment> = enrollments
            .values()
            .filter(|e| e.user_id == enrollment.user_id)
            .collect();
        if held.iter().any(|e| e.course_id == enrollment.course_id) {
            return Err(EnrollmentStoreError::Duplicate);
        }
        if held.len() >= max_enrollments {
            return Err(EnrollmentStoreError::LimitReached(max_enrollments));
        }
        enrollments.insert(enrollment.enrollment_id, enrollment.clone());
        Ok(enrollment)
    }

    async fn remove(&self, enrollment: &Enrollment) -> Result<(), EnrollmentStoreError> {
        self.enrollments
            .lock()
            .await
            .remove(&enrollment.enrollment_id)
            .map(|_| ())
            .ok_or(EnrollmentStoreError::NotFound)
    }

    async fn list_for_user(&self, user_id: &Uuid) -> Result<Vec<Enrollment>, EnrollmentStoreError> {
        let mut enrollments: Vec<Enrollment> = self
            .enrollments
            .lock()
            .await
            .values()
            .filter(|e| &e.user_id == user_id)
            .cloned()
            .collect();
        enrollments.sort_by_key(|e| e.enrolled_at);
        Ok(enrollments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 3;

    fn enrollment(user_id: Uuid, course_id: Uuid) -> Enrollment {
        Enrollment::builder()
            .user_id(user_id)
            .user_email("barbara@example.com")
            .course_id(course_id)
            .course_title("Type Theory")
            .build()
    }

    #[tokio::test]
    async fn one_enrollment_per_user_and_course() {
        let store = InMemoryEnrollments::new();
        let (user, course) = (Uuid::new_v4(), Uuid::new_v4());

        store.create(enrollment(user, course), MAX).await.unwrap();

        assert!(matches!(
            store.create(enrollment(user, course), MAX).await,
            Err(EnrollmentStoreError::Duplicate)
        ));
        assert_eq!(store.count_for_user(&user).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn remove_then_find_returns_nothing() {
        let store = InMemoryEnrollments::new();
        let (user, course) = (Uuid::new_v4(), Uuid::new_v4());
        let created = store.create(enrollment(user, course), MAX).await.unwrap();

        store.remove(&created).await.unwrap();

        assert_eq!(store.find_by_user_and_course(&user, &course).await.unwrap(), None);
        assert!(matches!(
            store.remove(&created).await,
            Err(EnrollmentStoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn listing_only_returns_the_users_enrollments() {
        let store = InMemoryEnrollments::new();
        let (user, other) = (Uuid::new_v4(), Uuid::new_v4());
        store.create(enrollment(user, Uuid::new_v4()), MAX).await.unwrap();
        store.create(enrollment(user, Uuid::new_v4()), MAX).await.unwrap();
        store.create(enrollment(other, Uuid::new_v4()), MAX).await.unwrap();

        let listed = store.list_for_user(&user).await.unwrap();

        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|e| e.user_id == user));
    }

    #[tokio::test]
    async fn create_refuses_past_the_limit() {
        let store = InMemoryEnrollments::new();
        let user = Uuid::new_v4();
        for _ in 0..MAX {
            store.create(enrollment(user, Uuid::new_v4()), MAX).await.unwrap();
        }

        assert!(matches!(
            store.create(enrollment(user, Uuid::new_v4()), MAX).await,
            Err(EnrollmentStoreError::LimitReached(MAX))
        ));
        assert_eq!(store.count_for_user(&user).await.unwrap(), MAX);
    }
}
