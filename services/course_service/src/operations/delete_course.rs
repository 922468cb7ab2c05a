use course_service_core::{EndpointError, OperationError};
use thiserror::Error;
use tonic::metadata::MetadataMap;

use super::{authenticate, parse_id};
use crate::context::Context;
use crate::course::CatalogError;
use crate::svc::{DeleteCourseInput, DeleteCourseOutput};

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DeleteCourseError {
    #[error("Course not found.")]
    CourseNotFound,

    #[error("Only the instructor of a course may delete it.")]
    NotInstructor,
}

/// Deletes a course. Enrollments in it are kept as history; unenrolling from a deleted course still works.
pub(crate) async fn delete_course(
    ctx: &Context,
    metadata: &MetadataMap,
    input: &DeleteCourseInput,
) -> Result<DeleteCourseOutput, EndpointError<DeleteCourseError>> {
    let identity = authenticate(ctx, metadata)?;
    let course_id = parse_id(&input.course_id, "course")?;

    let map_catalog_err = |err: CatalogError| match err {
        CatalogError::NotFound => EndpointError::operation(DeleteCourseError::CourseNotFound),
        e => {
            tracing::error!(error = ?e, %course_id, "Delete course failed.");
            EndpointError::internal()
        }
    };

    let course = ctx.catalog.get_course(&course_id).await.map_err(map_catalog_err)?;
    if !course.is_owned_by(identity.user_id()) {
        return Err(EndpointError::operation(DeleteCourseError::NotInstructor));
    }

    ctx.catalog.delete_course(&course_id).await.map_err(map_catalog_err)?;

    tracing::info!(%course_id, "Course deleted.");
    Ok(DeleteCourseOutput {})
}

impl OperationError for DeleteCourseError {
    fn code(&self) -> tonic::Code {
        match self {
            Self::CourseNotFound => tonic::Code::NotFound,
            Self::NotInstructor => tonic::Code::PermissionDenied,
        }
    }
}

#[cfg(test)]
mod tests {
    use tonic::Code;

    use super::*;
    use crate::operations::create_course::{create_course, tests::input};
    use crate::operations::test_support::{context, user};

    #[tokio::test]
    async fn instructor_deletes_course() {
        let ctx = context();
        let (_, metadata) = user("john");
        let created = create_course(&ctx, &metadata, &input("Lisp", 5)).await.unwrap();
        let input = DeleteCourseInput {
            course_id: created.course_id,
        };

        delete_course(&ctx, &metadata, &input).await.unwrap();

        assert!(ctx.catalog.list_courses().await.unwrap().is_empty());
        assert_eq!(
            delete_course(&ctx, &metadata, &input).await.unwrap_err().code(),
            Code::NotFound
        );
    }

    #[tokio::test]
    async fn other_users_cannot_delete() {
        let ctx = context();
        let (_, owner) = user("john");
        let (_, intruder) = user("mallory");
        let created = create_course(&ctx, &owner, &input("Lisp", 5)).await.unwrap();

        let err = delete_course(
            &ctx,
            &intruder,
            &DeleteCourseInput {
                course_id: created.course_id,
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.code(), Code::PermissionDenied);
        assert_eq!(ctx.catalog.list_courses().await.unwrap().len(), 1);
    }
}
