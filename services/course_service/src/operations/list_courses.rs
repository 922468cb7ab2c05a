use chrono::{DateTime, Utc};
use course_service_core::operation_error::Infallible;
use course_service_core::{simple_err_map, EndpointError};
use uuid::Uuid;

use crate::context::Context;
use crate::course::Course;
use crate::svc::{ListCoursesInput, ListCoursesOutput};

const DEFAULT_PAGE_SIZE: usize = 32;
const MAX_PAGE_SIZE: usize = 100;

/// Position in the newest-first listing: the creation time and ID of the last course of the previous page.
#[derive(Debug, Clone, PartialEq)]
struct PageCursor {
    created_at: DateTime<Utc>,
    course_id: Uuid,
}

impl PageCursor {
    fn after(course: &Course) -> Self {
        Self {
            created_at: course.created_at,
            course_id: course.course_id,
        }
    }

    fn encode(&self) -> String {
        base64::encode(format!("{}|{}", self.created_at.to_rfc3339(), self.course_id))
    }

    fn decode(token: &str) -> Option<Self> {
        let raw = String::from_utf8(base64::decode(token).ok()?).ok()?;
        let (created_at, course_id) = raw.split_once('|')?;
        Some(Self {
            created_at: DateTime::parse_from_rfc3339(created_at).ok()?.with_timezone(&Utc),
            course_id: Uuid::parse_str(course_id).ok()?,
        })
    }

    /// Whether the course comes after the cursor in the newest-first order.
    fn precedes(&self, course: &Course) -> bool {
        (course.created_at, course.course_id) < (self.created_at, self.course_id)
    }
}

/// Lists the catalog newest first, one page at a time.
pub(crate) async fn list_courses(
    ctx: &Context,
    input: &ListCoursesInput,
) -> Result<ListCoursesOutput, EndpointError<Infallible>> {
    let page_size = match input.page_size as usize {
        0 => DEFAULT_PAGE_SIZE,
        n => n.min(MAX_PAGE_SIZE),
    };
    let cursor = if input.starting_token.is_empty() {
        None
    } else {
        Some(
            PageCursor::decode(&input.starting_token)
                .ok_or_else(|| EndpointError::validation("Could not parse StartingToken."))?,
        )
    };

    let mut courses = ctx
        .catalog
        .list_courses()
        .await
        .map_err(simple_err_map!("List courses failed.", EndpointError::internal()))?;
    // Ties on the creation time are broken by ID so that pages never overlap.
    courses.sort_by(|a, b| (b.created_at, b.course_id).cmp(&(a.created_at, a.course_id)));

    let mut page: Vec<Course> = courses
        .into_iter()
        .filter(|course| cursor.as_ref().map_or(true, |c| c.precedes(course)))
        .take(page_size + 1)
        .collect();
    let next_token = if page.len() > page_size {
        page.truncate(page_size);
        page.last().map(|last| PageCursor::after(last).encode()).unwrap_or_default()
    } else {
        String::new()
    };

    tracing::debug!(page_size, returned = page.len(), more = !next_token.is_empty(), "Listed courses.");
    Ok(ListCoursesOutput {
        courses: page.into_iter().map(Into::into).collect(),
        next_token,
    })
}
