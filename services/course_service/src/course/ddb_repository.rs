use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::{DeleteItemError, DeleteItemErrorKind, PutItemError, PutItemErrorKind};
use aws_sdk_dynamodb::error::{UpdateItemError, UpdateItemErrorKind};
use aws_sdk_dynamodb::model::AttributeValue;
use aws_sdk_dynamodb::types::SdkError;
use common_macros::hash_map;
use course_service_core::ddb::delete_item::{DeleteItem, DeleteItemInput};
use course_service_core::ddb::get_item::{GetItem, GetItemInput};
use course_service_core::ddb::put_item::{PutItem, PutItemInput};
use course_service_core::ddb::scan::{Scan, ScanInput};
use course_service_core::ddb::update_item::{UpdateItem, UpdateItemInput};
use course_service_core::ddb::{Item, ItemError};
use uuid::Uuid;

use super::repository::newest_first;
use super::{CatalogError, Course, CourseAttributes, CourseCatalog};

/// Attribute names of the courses table.
pub(crate) mod attr {
    pub const COURSE_ID: &str = "CourseId";
    pub const TITLE: &str = "Title";
    pub const SHORT_DESCRIPTION: &str = "ShortDescription";
    pub const FULL_DESCRIPTION: &str = "FullDescription";
    pub const IMAGE_URL: &str = "ImageUrl";
    pub const DURATION: &str = "Duration";
    pub const SEATS_REMAINING: &str = "SeatsRemaining";
    pub const INSTRUCTOR_ID: &str = "InstructorId";
    pub const INSTRUCTOR_EMAIL: &str = "InstructorEmail";
    pub const CREATED_AT: &str = "CreatedAt";
}

pub trait CatalogDdbClient: GetItem + PutItem + UpdateItem + DeleteItem + Scan + Send + Sync {}
impl<T: GetItem + PutItem + UpdateItem + DeleteItem + Scan + Send + Sync> CatalogDdbClient for T {}

pub struct DdbCourseCatalog<T: CatalogDdbClient> {
    ddb: T,
    courses_table_name: String,
}

/// Key of a course in the courses table.
pub(crate) fn course_key(course_id: &Uuid) -> HashMap<String, AttributeValue> {
    hash_map! {
        attr::COURSE_ID.to_owned() => AttributeValue::S(course_id.to_string()),
    }
}

impl From<&Course> for Item {
    fn from(course: &Course) -> Self {
        Item::new()
            .with_uuid(attr::COURSE_ID, &course.course_id)
            .with_s(attr::TITLE, course.attributes.title.as_str())
            .with_s(attr::SHORT_DESCRIPTION, course.attributes.short_description.as_str())
            .with_s(attr::FULL_DESCRIPTION, course.attributes.full_description.as_str())
            .with_s(attr::IMAGE_URL, course.attributes.image_url.as_str())
            .with_s(attr::DURATION, course.attributes.duration.as_str())
            .with_n(attr::SEATS_REMAINING, course.seats_remaining)
            .with_uuid(attr::INSTRUCTOR_ID, &course.instructor_id)
            .with_s(attr::INSTRUCTOR_EMAIL, course.instructor_email.as_str())
            .with_timestamp(attr::CREATED_AT, &course.created_at)
    }
}

impl TryFrom<Item> for Course {
    type Error = ItemError;

    fn try_from(item: Item) -> Result<Self, Self::Error> {
        Ok(Course {
            course_id: item.uuid(attr::COURSE_ID)?,
            attributes: CourseAttributes {
                title: item.s(attr::TITLE)?.to_owned(),
                short_description: item.s(attr::SHORT_DESCRIPTION)?.to_owned(),
                full_description: item.s(attr::FULL_DESCRIPTION)?.to_owned(),
                image_url: item.s(attr::IMAGE_URL)?.to_owned(),
                duration: item.s(attr::DURATION)?.to_owned(),
            },
            seats_remaining: item.n(attr::SEATS_REMAINING)?,
            instructor_id: item.uuid(attr::INSTRUCTOR_ID)?,
            instructor_email: item.s(attr::INSTRUCTOR_EMAIL)?.to_owned(),
            created_at: item.timestamp(attr::CREATED_AT)?,
        })
    }
}

impl<T: CatalogDdbClient> DdbCourseCatalog<T> {
    pub fn new(ddb: T, courses_table_name: impl Into<String>) -> Self {
        Self {
            ddb,
            courses_table_name: courses_table_name.into(),
        }
    }

    /// Scans the whole table, following pagination, keeping the items matching the optional filter.
    async fn scan_courses(
        &self,
        filter_expression: Option<String>,
        expression_attribute_values: Option<HashMap<String, AttributeValue>>,
    ) -> Result<Vec<Course>, CatalogError> {
        let mut courses = vec![];
        let mut exclusive_start_key = None;

        loop {
            let scan_input = ScanInput::builder()
                .table_name(self.courses_table_name.as_str())
                .exclusive_start_key(exclusive_start_key)
                .filter_expression(filter_expression.clone())
                .expression_attribute_values(expression_attribute_values.clone())
                .build();
            let output = self
                .ddb
                .scan(scan_input)
                .await
                .map_err(|e| CatalogError::Datastore(e.into()))?;

            for item in output.items.unwrap_or_default() {
                let course = Course::try_from(Item::from(item)).map_err(|e| CatalogError::Datastore(e.into()))?;
                courses.push(course);
            }

            match output.last_evaluated_key {
                Some(key) => exclusive_start_key = Some(key),
                None => break,
            }
        }

        newest_first(&mut courses);
        Ok(courses)
    }
}

#[async_trait]
impl<T: CatalogDdbClient> CourseCatalog for DdbCourseCatalog<T> {
    async fn create_course(&self, course: &Course) -> Result<(), CatalogError> {
        let put_item_input = PutItemInput::builder()
            .table_name(self.courses_table_name.as_str())
            .item(Item::from(course))
            .condition_expression(format!("attribute_not_exists({})", attr::COURSE_ID))
            .build();

        self.ddb.put_item(put_item_input).await.map_err(|err| match err {
            SdkError::ServiceError {
                err:
                    PutItemError {
                        kind: PutItemErrorKind::ConditionalCheckFailedException(_),
                        ..
                    },
                ..
            } => CatalogError::Duplicate,
            e => CatalogError::Datastore(e.into()),
        })?;

        Ok(())
    }

    async fn get_course(&self, course_id: &Uuid) -> Result<Course, CatalogError> {
        let get_item_input = GetItemInput::builder()
            .table_name(self.courses_table_name.as_str())
            .key(course_key(course_id))
            .build();
        let output = self
            .ddb
            .get_item(get_item_input)
            .await
            .map_err(|e| CatalogError::Datastore(e.into()))?;

        match output.item {
            None => Err(CatalogError::NotFound),
            Some(item) => Course::try_from(Item::from(item)).map_err(|e| CatalogError::Datastore(e.into())),
        }
    }

    async fn list_courses(&self) -> Result<Vec<Course>, CatalogError> {
        self.scan_courses(None, None).await
    }

    async fn list_courses_for_instructor(&self, instructor_id: &Uuid) -> Result<Vec<Course>, CatalogError> {
        self.scan_courses(
            Some(format!("{} = :instructor_id", attr::INSTRUCTOR_ID)),
            Some(hash_map! {
                ":instructor_id".to_owned() => AttributeValue::S(instructor_id.to_string()),
            }),
        )
        .await
    }

    async fn update_course(&self, course_id: &Uuid, attributes: &CourseAttributes) -> Result<(), CatalogError> {
        // Title, Duration and friends are DynamoDB reserved words. SeatsRemaining is only written by the ledger.
        let update_item_input = UpdateItemInput::builder()
            .table_name(self.courses_table_name.as_str())
            .key(course_key(course_id))
            .update_expression("SET #title = :title, #short = :short, #full = :full, #image = :image, #duration = :duration")
            .condition_expression(format!("attribute_exists({})", attr::COURSE_ID))
            .expression_attribute_names(hash_map! {
                "#title".to_owned() => attr::TITLE.to_owned(),
                "#short".to_owned() => attr::SHORT_DESCRIPTION.to_owned(),
                "#full".to_owned() => attr::FULL_DESCRIPTION.to_owned(),
                "#image".to_owned() => attr::IMAGE_URL.to_owned(),
                "#duration".to_owned() => attr::DURATION.to_owned(),
            })
            .expression_attribute_values(hash_map! {
                ":title".to_owned() => AttributeValue::S(attributes.title.clone()),
                ":short".to_owned() => AttributeValue::S(attributes.short_description.clone()),
                ":full".to_owned() => AttributeValue::S(attributes.full_description.clone()),
                ":image".to_owned() => AttributeValue::S(attributes.image_url.clone()),
                ":duration".to_owned() => AttributeValue::S(attributes.duration.clone()),
            })
            .build();

        self.ddb.update_item(update_item_input).await.map_err(|err| match err {
            SdkError::ServiceError {
                err:
                    UpdateItemError {
                        kind: UpdateItemErrorKind::ConditionalCheckFailedException(_),
                        ..
                    },
                ..
            } => CatalogError::NotFound,
            e => CatalogError::Datastore(e.into()),
        })?;

        Ok(())
    }

    async fn delete_course(&self, course_id: &Uuid) -> Result<(), CatalogError> {
        let delete_item_input = DeleteItemInput::builder()
            .table_name(self.courses_table_name.as_str())
            .key(course_key(course_id))
            .condition_expression(format!("attribute_exists({})", attr::COURSE_ID))
            .build();

        self.ddb.delete_item(delete_item_input).await.map_err(|err| match err {
            SdkError::ServiceError {
                err:
                    DeleteItemError {
                        kind: DeleteItemErrorKind::ConditionalCheckFailedException(_),
                        ..
                    },
                ..
            } => CatalogError::NotFound,
            e => CatalogError::Datastore(e.into()),
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn course_survives_item_encoding() {
        let course = Course::builder()
            .attributes(
                CourseAttributes::builder()
                    .title("Async Rust")
                    .short_description("Futures and executors.")
                    .duration("6 weeks")
                    .build(),
            )
            .seats_remaining(25)
            .instructor_id(Uuid::new_v4())
            .instructor_email("linus@example.com")
            .created_at(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap())
            .build();

        let decoded = Course::try_from(Item::from(&course)).unwrap();

        assert_eq!(decoded, course);
    }

    #[test]
    fn record_without_seat_counter_is_rejected() {
        let course_id = Uuid::new_v4();
        let item = Item::new().with_uuid(attr::COURSE_ID, &course_id).with_s(attr::TITLE, "Incomplete");

        assert!(Course::try_from(item).is_err());
    }

    #[test]
    fn course_key_uses_the_hyphenated_id() {
        let course_id = Uuid::new_v4();

        let key = course_key(&course_id);

        assert_eq!(key.get(attr::COURSE_ID), Some(&AttributeValue::S(course_id.to_string())));
    }
}
