use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::model::AttributeValue;
use common_macros::hash_map;
use course_service_core::ddb::delete_item::DeleteItemInput;
use course_service_core::ddb::get_item::{GetItem, GetItemInput};
use course_service_core::ddb::put_item::PutItemInput;
use course_service_core::ddb::query::{Query, QueryInput};
use course_service_core::ddb::transact_write_items::{
    failed_conditions, TransactWrite, TransactWriteItems, TransactWriteItemsInput,
};
use course_service_core::ddb::update_item::UpdateItemInput;
use course_service_core::ddb::{Item, ItemError};
use uuid::Uuid;

use super::{Enrollment, EnrollmentStore, EnrollmentStoreError};

mod attr {
    pub const ENROLLMENT_ID: &str = "EnrollmentId";
    pub const USER_ACCOUNT_ID: &str = "UserAccountId";
    pub const USER_EMAIL: &str = "UserEmail";
    pub const COURSE_ID: &str = "CourseId";
    pub const COURSE_TITLE: &str = "CourseTitle";
    pub const ENROLLED_AT: &str = "EnrolledAt";
    pub const ENROLLMENT_COUNT: &str = "EnrollmentCount";
}

/// Sort key of the per-user counter item. Course IDs are UUIDs, so it cannot collide with an enrollment.
const COUNTER_SORT_KEY: &str = "#EnrollmentCount";

pub trait EnrollmentDdbClient: GetItem + Query + TransactWriteItems + Send + Sync {}
impl<T: GetItem + Query + TransactWriteItems + Send + Sync> EnrollmentDdbClient for T {}

/// Enrollment store over a table keyed by (`UserAccountId`, `CourseId`), which makes the key itself enforce
/// one enrollment per user and course.
///
/// Each user also has a counter item under the sort key `#EnrollmentCount`. Creating and removing an
/// enrollment write the record and the counter in one transaction, and the counter's `< :max` condition is
/// what enforces the per-user limit under concurrent enrolls.
pub struct DdbEnrollmentStore<T: EnrollmentDdbClient> {
    ddb: T,
    enrollments_table_name: String,
}

fn enrollment_key(user_id: &Uuid, course_id: &Uuid) -> HashMap<String, AttributeValue> {
    hash_map! {
        attr::USER_ACCOUNT_ID.to_owned() => AttributeValue::S(user_id.to_string()),
        attr::COURSE_ID.to_owned() => AttributeValue::S(course_id.to_string()),
    }
}

fn counter_key(user_id: &Uuid) -> HashMap<String, AttributeValue> {
    hash_map! {
        attr::USER_ACCOUNT_ID.to_owned() => AttributeValue::S(user_id.to_string()),
        attr::COURSE_ID.to_owned() => AttributeValue::S(COUNTER_SORT_KEY.to_owned()),
    }
}

impl From<&Enrollment> for Item {
    fn from(enrollment: &Enrollment) -> Self {
        Item::new()
            .with_uuid(attr::ENROLLMENT_ID, &enrollment.enrollment_id)
            .with_uuid(attr::USER_ACCOUNT_ID, &enrollment.user_id)
            .with_s(attr::USER_EMAIL, enrollment.user_email.as_str())
            .with_uuid(attr::COURSE_ID, &enrollment.course_id)
            .with_s(attr::COURSE_TITLE, enrollment.course_title.as_str())
            .with_timestamp(attr::ENROLLED_AT, &enrollment.enrolled_at)
    }
}

impl TryFrom<Item> for Enrollment {
    type Error = ItemError;

    fn try_from(item: Item) -> Result<Self, Self::Error> {
        Ok(Enrollment {
            enrollment_id: item.uuid(attr::ENROLLMENT_ID)?,
            user_id: item.uuid(attr::USER_ACCOUNT_ID)?,
            user_email: item.s(attr::USER_EMAIL)?.to_owned(),
            course_id: item.uuid(attr::COURSE_ID)?,
            course_title: item.s(attr::COURSE_TITLE)?.to_owned(),
            enrolled_at: item.timestamp(attr::ENROLLED_AT)?,
        })
    }
}

impl<T: EnrollmentDdbClient> DdbEnrollmentStore<T> {
    pub fn new(ddb: T, enrollments_table_name: impl Into<String>) -> Self {
        Self {
            ddb,
            enrollments_table_name: enrollments_table_name.into(),
        }
    }

    /// Enrollment records of the user; the filter leaves out the counter item.
    fn user_query(&self, user_id: &Uuid, start: Option<HashMap<String, AttributeValue>>) -> QueryInput {
        QueryInput::builder()
            .table_name(self.enrollments_table_name.as_str())
            .key_condition_expression(format!("{} = :user_id", attr::USER_ACCOUNT_ID))
            .filter_expression(format!("attribute_exists({})", attr::ENROLLMENT_ID))
            .expression_attribute_values(hash_map! {
                ":user_id".to_owned() => AttributeValue::S(user_id.to_string()),
            })
            .exclusive_start_key(start)
            .consistent_read(true)
            .build()
    }

    fn counter_increment(&self, user_id: &Uuid, max_enrollments: usize) -> UpdateItemInput {
        UpdateItemInput::builder()
            .table_name(self.enrollments_table_name.as_str())
            .key(counter_key(user_id))
            .update_expression(format!("ADD {} :one", attr::ENROLLMENT_COUNT))
            .condition_expression(format!(
                "attribute_not_exists({count}) OR {count} < :max",
                count = attr::ENROLLMENT_COUNT
            ))
            .expression_attribute_values(hash_map! {
                ":one".to_owned() => AttributeValue::N("1".to_owned()),
                ":max".to_owned() => AttributeValue::N(max_enrollments.to_string()),
            })
            .build()
    }

    fn counter_decrement(&self, user_id: &Uuid) -> UpdateItemInput {
        UpdateItemInput::builder()
            .table_name(self.enrollments_table_name.as_str())
            .key(counter_key(user_id))
            .update_expression(format!("ADD {} :minus_one", attr::ENROLLMENT_COUNT))
            .expression_attribute_values(hash_map! {
                ":minus_one".to_owned() => AttributeValue::N("-1".to_owned()),
            })
            .build()
    }
}

#[async_trait]
impl<T: EnrollmentDdbClient> EnrollmentStore for DdbEnrollmentStore<T> {
    async fn find_by_user_and_course(
        &self,
        user_id: &Uuid,
        course_id: &Uuid,
    ) -> Result<Option<Enrollment>, EnrollmentStoreError> {
        let get_item_input = GetItemInput::builder()
            .table_name(self.enrollments_table_name.as_str())
            .key(enrollment_key(user_id, course_id))
            .consistent_read(true)
            .build();
        let output = self
            .ddb
            .get_item(get_item_input)
            .await
            .map_err(|e| EnrollmentStoreError::Datastore(e.into()))?;

        output
            .item
            .map(|item| Enrollment::try_from(Item::from(item)))
            .transpose()
            .map_err(|e| EnrollmentStoreError::Datastore(e.into()))
    }

    async fn count_for_user(&self, user_id: &Uuid) -> Result<usize, EnrollmentStoreError> {
        let get_item_input = GetItemInput::builder()
            .table_name(self.enrollments_table_name.as_str())
            .key(counter_key(user_id))
            .consistent_read(true)
            .projection_expression(attr::ENROLLMENT_COUNT)
            .build();
        let output = self
            .ddb
            .get_item(get_item_input)
            .await
            .map_err(|e| EnrollmentStoreError::Datastore(e.into()))?;

        match output.item {
            Some(item) => Item::from(item)
                .n::<usize>(attr::ENROLLMENT_COUNT)
                .map_err(|e| EnrollmentStoreError::Datastore(e.into())),
            None => Ok(0),
        }
    }

    async fn create(&self, enrollment: Enrollment, max_enrollments: usize) -> Result<Enrollment, EnrollmentStoreError> {
        let put_item_input = PutItemInput::builder()
            .table_name(self.enrollments_table_name.as_str())
            .item(Item::from(&enrollment))
            .condition_expression(format!("attribute_not_exists({})", attr::USER_ACCOUNT_ID))
            .build();
        let input = TransactWriteItemsInput::builder()
            .writes(vec![
                TransactWrite::Update(self.counter_increment(&enrollment.user_id, max_enrollments)),
                TransactWrite::Put(put_item_input),
            ])
            .build();

        match self.ddb.transact_write_items(input).await {
            Ok(_) => Ok(enrollment),
            Err(err) => match failed_conditions(&err).as_deref() {
                Some([_, true]) => Err(EnrollmentStoreError::Duplicate),
                Some([true, _]) => Err(EnrollmentStoreError::LimitReached(max_enrollments)),
                _ => Err(EnrollmentStoreError::Datastore(err.into())),
            },
        }
    }

    async fn remove(&self, enrollment: &Enrollment) -> Result<(), EnrollmentStoreError> {
        let delete_item_input = DeleteItemInput::builder()
            .table_name(self.enrollments_table_name.as_str())
            .key(enrollment_key(&enrollment.user_id, &enrollment.course_id))
            .condition_expression(format!("{} = :enrollment_id", attr::ENROLLMENT_ID))
            .expression_attribute_values(hash_map! {
                ":enrollment_id".to_owned() => AttributeValue::S(enrollment.enrollment_id.to_string()),
            })
            .build();
        let input = TransactWriteItemsInput::builder()
            .writes(vec![
                TransactWrite::Delete(delete_item_input),
                TransactWrite::Update(self.counter_decrement(&enrollment.user_id)),
            ])
            .build();

        match self.ddb.transact_write_items(input).await {
            Ok(_) => Ok(()),
            Err(err) => match failed_conditions(&err).as_deref() {
                Some([true, ..]) => Err(EnrollmentStoreError::NotFound),
                _ => Err(EnrollmentStoreError::Datastore(err.into())),
            },
        }
    }

    async fn list_for_user(&self, user_id: &Uuid) -> Result<Vec<Enrollment>, EnrollmentStoreError> {
        let mut enrollments = vec![];
        let mut start = None;

        loop {
            let output = self
                .ddb
                .query(self.user_query(user_id, start))
                .await
                .map_err(|e| EnrollmentStoreError::Datastore(e.into()))?;

            for item in output.items.unwrap_or_default() {
                let enrollment =
                    Enrollment::try_from(Item::from(item)).map_err(|e| EnrollmentStoreError::Datastore(e.into()))?;
                enrollments.push(enrollment);
            }

            match output.last_evaluated_key {
                Some(key) => start = Some(key),
                None => break,
            }
        }

        enrollments.sort_by_key(|e| e.enrolled_at);
        Ok(enrollments)
    }
}
