use course_service_core::operation_error::Infallible;
use course_service_core::EndpointError;
use tonic::metadata::MetadataMap;
use validator::Validate;

use super::authenticate;
use crate::context::Context;
use crate::course::{CatalogError, Course, CourseAttributes};
use crate::svc::{CreateCourseInput, CreateCourseOutput};

/// Creates a course taught by the caller.
pub(crate) async fn create_course(
    ctx: &Context,
    metadata: &MetadataMap,
    input: &CreateCourseInput,
) -> Result<CreateCourseOutput, EndpointError<Infallible>> {
    let identity = authenticate(ctx, metadata)?;

    let attributes: CourseAttributes = input
        .attributes
        .clone()
        .ok_or_else(|| EndpointError::validation("Course attributes missing."))?
        .into();
    let course = Course::builder()
        .attributes(attributes)
        .seats_remaining(input.seats)
        .instructor_id(*identity.user_id())
        .instructor_email(identity.email())
        .build();
    course
        .validate()
        .map_err(|e| EndpointError::validation(e.to_string()))?;

    ctx.catalog.create_course(&course).await.map_err(|err| match err {
        CatalogError::Duplicate => {
            tracing::error!(course_id = %course.course_id, "Generated course ID already exists.");
            EndpointError::internal()
        }
        e => {
            tracing::error!(error = ?e, "Create course failed.");
            EndpointError::internal()
        }
    })?;

    tracing::info!(course_id = %course.course_id, seats = course.seats_remaining, "Course created.");
    Ok(CreateCourseOutput {
        course_id: course.course_id.to_string(),
    })
}
