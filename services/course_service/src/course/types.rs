use chrono::{DateTime, Utc};
use typed_builder::TypedBuilder;
use uuid::Uuid;
use validator::Validate;

/// Descriptive fields of a course, the only part of a course its instructor may edit after creation.
#[derive(Debug, Clone, PartialEq, Default, TypedBuilder, Validate)]
pub struct CourseAttributes {
    #[builder(setter(into))]
    #[validate(length(min = 1, message = "Title is required."))]
    pub title: String,

    #[builder(setter(into))]
    #[validate(length(min = 1, message = "Short description is required."))]
    pub short_description: String,

    #[builder(default, setter(into))]
    pub full_description: String,

    #[builder(default, setter(into))]
    pub image_url: String,

    #[builder(default, setter(into))]
    pub duration: String,
}

/// A course as stored in the catalog.
///
/// `seats_remaining` is written once, at creation. From then on only the seat ledger changes it.
#[derive(Debug, Clone, PartialEq, TypedBuilder, Validate)]
pub struct Course {
    #[builder(default = Uuid::new_v4())]
    pub course_id: Uuid,

    #[validate]
    pub attributes: CourseAttributes,

    pub seats_remaining: u32,

    pub instructor_id: Uuid,

    #[builder(setter(into))]
    #[validate(email(message = "Instructor email address is invalid."))]
    pub instructor_email: String,

    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
}

impl Course {
    pub fn title(&self) -> &str {
        &self.attributes.title
    }

    pub fn is_owned_by(&self, user_id: &Uuid) -> bool {
        &self.instructor_id == user_id
    }
}
