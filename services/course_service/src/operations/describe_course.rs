use course_service_core::{EndpointError, OperationError};
use thiserror::Error;

use super::parse_id;
use crate::context::Context;
use crate::course::CatalogError;
use crate::svc::{DescribeCourseInput, DescribeCourseOutput};

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DescribeCourseError {
    #[error("Course not found.")]
    CourseNotFound,
}

pub(crate) async fn describe_course(
    ctx: &Context,
    input: &DescribeCourseInput,
) -> Result<DescribeCourseOutput, EndpointError<DescribeCourseError>> {
    let course_id = parse_id(&input.course_id, "course")?;

    let course = ctx.catalog.get_course(&course_id).await.map_err(|err| match err {
        CatalogError::NotFound => EndpointError::operation(DescribeCourseError::CourseNotFound),
        e => {
            tracing::error!(error = ?e, %course_id, "Describe course failed.");
            EndpointError::internal()
        }
    })?;

    Ok(DescribeCourseOutput {
        course: Some(course.into()),
    })
}

impl OperationError for DescribeCourseError {
    fn code(&self) -> tonic::Code {
        match self {
            Self::CourseNotFound => tonic::Code::NotFound,
        }
    }
}
