use crate::{course, enrollment, review};

tonic::include_proto!("course_service");

impl From<course::Course> for Course {
    fn from(course: course::Course) -> Self {
        Course {
            course_id: course.course_id.to_string(),
            title: course.attributes.title,
            short_description: course.attributes.short_description,
            full_description: course.attributes.full_description,
            image_url: course.attributes.image_url,
            duration: course.attributes.duration,
            seats_remaining: course.seats_remaining,
            instructor_id: course.instructor_id.to_string(),
            instructor_email: course.instructor_email,
            created_at: course.created_at.to_rfc3339(),
        }
    }
}

impl From<CourseAttributes> for course::CourseAttributes {
    fn from(attributes: CourseAttributes) -> Self {
        course::CourseAttributes {
            title: attributes.title.trim().to_owned(),
            short_description: attributes.short_description.trim().to_owned(),
            full_description: attributes.full_description,
            image_url: attributes.image_url,
            duration: attributes.duration,
        }
    }
}

impl From<enrollment::Enrollment> for Enrollment {
    fn from(enrollment: enrollment::Enrollment) -> Self {
        Enrollment {
            enrollment_id: enrollment.enrollment_id.to_string(),
            user_id: enrollment.user_id.to_string(),
            user_email: enrollment.user_email,
            course_id: enrollment.course_id.to_string(),
            course_title: enrollment.course_title,
            enrolled_at: enrollment.enrolled_at.to_rfc3339(),
        }
    }
}

impl From<review::Review> for Review {
    fn from(review: review::Review) -> Self {
        Review {
            review_id: review.review_id.to_string(),
            user_id: review.user_id.to_string(),
            user_email: review.user_email,
            course_id: review.course_id.to_string(),
            rating: u32::from(review.rating),
            comment: review.comment,
            created_at: review.created_at.to_rfc3339(),
        }
    }
}
