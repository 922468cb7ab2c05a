use course_service_core::{EndpointError, OperationError};
use thiserror::Error;
use tonic::metadata::MetadataMap;

use super::{authenticate, parse_id};
use crate::context::Context;
use crate::course::CatalogError;
use crate::enrollment::EnrollmentError;
use crate::svc::{EnrollInput, EnrollOutput};

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EnrollError {
    #[error("Course not found.")]
    CourseNotFound,

    #[error("Already enrolled in this course.")]
    AlreadyEnrolled,

    #[error("Cannot enroll in more than {0} courses.")]
    EnrollmentLimit(usize),

    #[error("No seats remaining in this course.")]
    NoSeats,
}

pub(crate) async fn enroll(
    ctx: &Context,
    metadata: &MetadataMap,
    input: &EnrollInput,
) -> Result<EnrollOutput, EndpointError<EnrollError>> {
    let identity = authenticate(ctx, metadata)?;
    let course_id = parse_id(&input.course_id, "course")?;

    let course = ctx.catalog.get_course(&course_id).await.map_err(|err| match err {
        CatalogError::NotFound => EndpointError::operation(EnrollError::CourseNotFound),
        e => {
            tracing::error!(error = ?e, %course_id, "Reading the course to enroll in failed.");
            EndpointError::internal()
        }
    })?;

    let enrolled = ctx
        .enrollments
        .enroll(&identity, course_id, course.attributes.title)
        .await
        .map_err(|err| match err {
            EnrollmentError::CourseNotFound => EndpointError::operation(EnrollError::CourseNotFound),
            EnrollmentError::AlreadyEnrolled => EndpointError::operation(EnrollError::AlreadyEnrolled),
            EnrollmentError::EnrollmentLimit(max) => EndpointError::operation(EnrollError::EnrollmentLimit(max)),
            EnrollmentError::NoSeats => EndpointError::operation(EnrollError::NoSeats),
            e => {
                tracing::error!(error = ?e, %course_id, "Enroll failed.");
                EndpointError::internal()
            }
        })?;

    Ok(EnrollOutput {
        enrollment: Some(enrolled.enrollment.into()),
        seats_remaining: enrolled.seats_remaining,
    })
}

impl OperationError for EnrollError {
    fn code(&self) -> tonic::Code {
        match self {
            Self::CourseNotFound => tonic::Code::NotFound,
            Self::AlreadyEnrolled => tonic::Code::AlreadyExists,
            Self::EnrollmentLimit(_) => tonic::Code::FailedPrecondition,
            Self::NoSeats => tonic::Code::ResourceExhausted,
        }
    }
}
