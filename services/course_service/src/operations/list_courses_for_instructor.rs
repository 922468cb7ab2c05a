use course_service_core::operation_error::Infallible;
use course_service_core::EndpointError;

use super::parse_id;
use crate::context::Context;
use crate::svc::{ListCoursesForInstructorInput, ListCoursesOutput};

pub(crate) async fn list_courses_for_instructor(
    ctx: &Context,
    input: &ListCoursesForInstructorInput,
) -> Result<ListCoursesOutput, EndpointError<Infallible>> {
    let instructor_id = parse_id(&input.instructor_id, "instructor")?;

    let courses = ctx
        .catalog
        .list_courses_for_instructor(&instructor_id)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, %instructor_id, "List courses for instructor failed.");
            EndpointError::internal()
        })?;

    Ok(ListCoursesOutput {
        courses: courses.into_iter().map(Into::into).collect(),
        next_token: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::create_course::{create_course, tests::input};
    use crate::operations::test_support::{context, user};

    #[tokio::test]
    async fn only_the_instructors_courses_are_listed() {
        let ctx = context();
        let (bjarne, bjarne_md) = user("bjarne");
        let (_, guido_md) = user("guido");
        create_course(&ctx, &bjarne_md, &input("Templates", 10)).await.unwrap();
        create_course(&ctx, &guido_md, &input("Generators", 10)).await.unwrap();

        let output = list_courses_for_instructor(
            &ctx,
            &ListCoursesForInstructorInput {
                instructor_id: bjarne.user_id().to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(output.courses.len(), 1);
        assert_eq!(output.courses[0].title, "Templates");
    }
}
