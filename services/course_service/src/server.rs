use tonic::{Request, Response, Status};

use crate::context::Context;
use crate::operations::create_course::create_course;
use crate::operations::delete_course::delete_course;
use crate::operations::describe_course::describe_course;
use crate::operations::describe_enrollment::describe_enrollment;
use crate::operations::enroll::enroll;
use crate::operations::list_courses::list_courses;
use crate::operations::list_courses_for_instructor::list_courses_for_instructor;
use crate::operations::list_enrollments::list_enrollments;
use crate::operations::list_reviews::list_reviews;
use crate::operations::submit_review::submit_review;
use crate::operations::unenroll::unenroll;
use crate::operations::update_course::update_course;
use crate::svc::course_service_server::CourseService;
use crate::svc::*;

pub struct CourseServiceImpl {
    ctx: Context,
}

impl CourseServiceImpl {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }
}

#[tonic::async_trait]
impl CourseService for CourseServiceImpl {
    #[tracing::instrument(skip_all)]
    async fn create_course(
        &self,
        request: Request<CreateCourseInput>,
    ) -> Result<Response<CreateCourseOutput>, Status> {
        create_course(&self.ctx, request.metadata(), request.get_ref())
            .await
            .map(Response::new)
            .map_err(|err| err.into())
    }

    #[tracing::instrument(skip_all)]
    async fn describe_course(
        &self,
        request: Request<DescribeCourseInput>,
    ) -> Result<Response<DescribeCourseOutput>, Status> {
        describe_course(&self.ctx, request.get_ref())
            .await
            .map(Response::new)
            .map_err(|err| err.into())
    }

    #[tracing::instrument(skip_all)]
    async fn list_courses(&self, request: Request<ListCoursesInput>) -> Result<Response<ListCoursesOutput>, Status> {
        list_courses(&self.ctx, request.get_ref())
            .await
            .map(Response::new)
            .map_err(|err| err.into())
    }

    #[tracing::instrument(skip_all)]
    async fn list_courses_for_instructor(
        &self,
        request: Request<ListCoursesForInstructorInput>,
    ) -> Result<Response<ListCoursesOutput>, Status> {
        list_courses_for_instructor(&self.ctx, request.get_ref())
            .await
            .map(Response::new)
            .map_err(|err| err.into())
    }

    #[tracing::instrument(skip_all)]
    async fn update_course(
        &self,
        request: Request<UpdateCourseInput>,
    ) -> Result<Response<UpdateCourseOutput>, Status> {
        update_course(&self.ctx, request.metadata(), request.get_ref())
            .await
            .map(Response::new)
            .map_err(|err| err.into())
    }

    #[tracing::instrument(skip_all)]
    async fn delete_course(
        &self,
        request: Request<DeleteCourseInput>,
    ) -> Result<Response<DeleteCourseOutput>, Status> {
        delete_course(&self.ctx, request.metadata(), request.get_ref())
            .await
            .map(Response::new)
            .map_err(|err| err.into())
    }

    #[tracing::instrument(skip_all)]
    async fn enroll(&self, request: Request<EnrollInput>) -> Result<Response<EnrollOutput>, Status> {
        enroll(&self.ctx, request.metadata(), request.get_ref())
            .await
            .map(Response::new)
            .map_err(|err| err.into())
    }

    #[tracing::instrument(skip_all)]
    async fn unenroll(&self, request: Request<UnenrollInput>) -> Result<Response<UnenrollOutput>, Status> {
        unenroll(&self.ctx, request.metadata(), request.get_ref())
            .await
            .map(Response::new)
            .map_err(|err| err.into())
    }

    #[tracing::instrument(skip_all)]
    async fn describe_enrollment(
        &self,
        request: Request<DescribeEnrollmentInput>,
    ) -> Result<Response<DescribeEnrollmentOutput>, Status> {
        describe_enrollment(&self.ctx, request.metadata(), request.get_ref())
            .await
            .map(Response::new)
            .map_err(|err| err.into())
    }

    #[tracing::instrument(skip_all)]
    async fn list_enrollments(
        &self,
        request: Request<ListEnrollmentsInput>,
    ) -> Result<Response<ListEnrollmentsOutput>, Status> {
        list_enrollments(&self.ctx, request.metadata(), request.get_ref())
            .await
            .map(Response::new)
            .map_err(|err| err.into())
    }

    #[tracing::instrument(skip_all)]
    async fn submit_review(
        &self,
        request: Request<SubmitReviewInput>,
    ) -> Result<Response<SubmitReviewOutput>, Status> {
        submit_review(&self.ctx, request.metadata(), request.get_ref())
            .await
            .map(Response::new)
            .map_err(|err| err.into())
    }

    #[tracing::instrument(skip_all)]
    async fn list_reviews(&self, request: Request<ListReviewsInput>) -> Result<Response<ListReviewsOutput>, Status> {
        list_reviews(&self.ctx, request.get_ref())
            .await
            .map(Response::new)
            .map_err(|err| err.into())
    }
}
