use course_service_core::{EndpointError, OperationError};
use thiserror::Error;
use tonic::metadata::MetadataMap;
use validator::Validate;

use super::{authenticate, parse_id};
use crate::context::Context;
use crate::course::{CatalogError, CourseAttributes};
use crate::svc::{UpdateCourseInput, UpdateCourseOutput};

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum UpdateCourseError {
    #[error("Course not found.")]
    CourseNotFound,

    #[error("Only the instructor of a course may edit it.")]
    NotInstructor,
}

/// Replaces the descriptive fields of a course. The seat count is left untouched.
pub(crate) async fn update_course(
    ctx: &Context,
    metadata: &MetadataMap,
    input: &UpdateCourseInput,
) -> Result<UpdateCourseOutput, EndpointError<UpdateCourseError>> {
    let identity = authenticate(ctx, metadata)?;
    let course_id = parse_id(&input.course_id, "course")?;
    let attributes: CourseAttributes = input
        .attributes
        .clone()
        .ok_or_else(|| EndpointError::validation("Course attributes missing."))?
        .into();
    attributes
        .validate()
        .map_err(|e| EndpointError::validation(e.to_string()))?;

    let map_catalog_err = |err: CatalogError| match err {
        CatalogError::NotFound => EndpointError::operation(UpdateCourseError::CourseNotFound),
        e => {
            tracing::error!(error = ?e, %course_id, "Update course failed.");
            EndpointError::internal()
        }
    };

    let course = ctx.catalog.get_course(&course_id).await.map_err(map_catalog_err)?;
    if !course.is_owned_by(identity.user_id()) {
        return Err(EndpointError::operation(UpdateCourseError::NotInstructor));
    }

    ctx.catalog
        .update_course(&course_id, &attributes)
        .await
        .map_err(map_catalog_err)?;

    tracing::info!(%course_id, "Course updated.");
    Ok(UpdateCourseOutput {})
}

impl OperationError for UpdateCourseError {
    fn code(&self) -> tonic::Code {
        match self {
            Self::CourseNotFound => tonic::Code::NotFound,
            Self::NotInstructor => tonic::Code::PermissionDenied,
        }
    }
}
