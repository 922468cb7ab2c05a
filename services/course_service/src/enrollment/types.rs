use chrono::{DateTime, Utc};
use typed_builder::TypedBuilder;
use uuid::Uuid;

/// The fact that a user joined a course at a given time.
///
/// Enrollments are never edited: they are created by an enroll and deleted by an unenroll. The email and the
/// course title are copies kept for display; the user ID is the identity key.
#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct Enrollment {
    #[builder(default = Uuid::new_v4())]
    pub enrollment_id: Uuid,

    pub user_id: Uuid,

    #[builder(setter(into))]
    pub user_email: String,

    pub course_id: Uuid,

    #[builder(setter(into))]
    pub course_title: String,

    #[builder(default = Utc::now())]
    pub enrolled_at: DateTime<Utc>,
}
