use async_trait::async_trait;
use aws_sdk_dynamodb::error::{UpdateItemError, UpdateItemErrorKind};
use aws_sdk_dynamodb::model::AttributeValue;
use aws_sdk_dynamodb::types::SdkError;
use common_macros::hash_map;
use course_service_core::ddb::get_item::{GetItem, GetItemInput};
use course_service_core::ddb::update_item::{UpdateItem, UpdateItemInput};
use course_service_core::ddb::Item;
use uuid::Uuid;

use super::{SeatLedger, SeatLedgerError};
use crate::course::ddb_repository::{attr, course_key};

pub trait LedgerDdbClient: GetItem + UpdateItem + Send + Sync {}
impl<T: GetItem + UpdateItem + Send + Sync> LedgerDdbClient for T {}

/// Seat ledger over the `SeatsRemaining` attribute of the courses table.
///
/// Adjustments are a single conditional `UpdateItem`: the `ADD` and the `SeatsRemaining >= :floor` guard are
/// evaluated atomically by DynamoDB, so concurrent enrollments cannot drive the counter below zero.
pub struct DdbSeatLedger<T: LedgerDdbClient> {
    ddb: T,
    courses_table_name: String,
}

impl<T: LedgerDdbClient> DdbSeatLedger<T> {
    pub fn new(ddb: T, courses_table_name: impl Into<String>) -> Self {
        Self {
            ddb,
            courses_table_name: courses_table_name.into(),
        }
    }

    fn adjust_input(&self, course_id: &Uuid, delta: i32) -> UpdateItemInput {
        // The counter must hold at least `-delta` seats for a decrement to succeed.
        let floor = if delta < 0 { delta.unsigned_abs() } else { 0 };

        UpdateItemInput::builder()
            .table_name(self.courses_table_name.as_str())
            .key(course_key(course_id))
            .update_expression(format!("ADD {} :delta", attr::SEATS_REMAINING))
            .condition_expression(format!(
                "attribute_exists({}) AND {} >= :floor",
                attr::COURSE_ID,
                attr::SEATS_REMAINING
            ))
            .expression_attribute_values(hash_map! {
                ":delta".to_owned() => AttributeValue::N(delta.to_string()),
                ":floor".to_owned() => AttributeValue::N(floor.to_string()),
            })
            .return_updated(true)
            .build()
    }
}

#[async_trait]
impl<T: LedgerDdbClient> SeatLedger for DdbSeatLedger<T> {
    async fn seats(&self, course_id: &Uuid) -> Result<u32, SeatLedgerError> {
        let get_item_input = GetItemInput::builder()
            .table_name(self.courses_table_name.as_str())
            .key(course_key(course_id))
            .consistent_read(true)
            .projection_expression(attr::SEATS_REMAINING)
            .build();
        let output = self
            .ddb
            .get_item(get_item_input)
            .await
            .map_err(|e| SeatLedgerError::Datastore(e.into()))?;

        let item = Item::from(output.item.ok_or(SeatLedgerError::NotFound)?);
        item.n::<u32>(attr::SEATS_REMAINING)
            .map_err(|e| SeatLedgerError::Datastore(e.into()))
    }

    async fn adjust_seats(&self, course_id: &Uuid, delta: i32) -> Result<u32, SeatLedgerError> {
        let output = match self.ddb.update_item(self.adjust_input(course_id, delta)).await {
            Ok(output) => output,
            Err(SdkError::ServiceError {
                err:
                    UpdateItemError {
                        kind: UpdateItemErrorKind::ConditionalCheckFailedException(_),
                        ..
                    },
                ..
            }) => {
                // Either the course does not exist or there are not enough seats; a fresh read tells which.
                let remaining = self.seats(course_id).await?;
                return Err(SeatLedgerError::Capacity { remaining, delta });
            }
            Err(e) => return Err(SeatLedgerError::Datastore(e.into())),
        };

        let attributes = output
            .attributes
            .ok_or_else(|| SeatLedgerError::Datastore("Malformed reply: missing attributes".into()))?;
        Item::from(attributes)
            .n::<u32>(attr::SEATS_REMAINING)
            .map_err(|e| SeatLedgerError::Datastore(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use aws_sdk_dynamodb::error::GetItemError;
    use aws_sdk_dynamodb::output::{GetItemOutput, UpdateItemOutput};

    use super::*;
    use crate::ddb_errors::update_condition_failed;

    /// Records update requests and answers with a fixed counter value. A missing counter means the course
    /// does not exist; a refusing fake fails every update on its condition.
    struct FakeCourses {
        seats: Option<u32>,
        refuse_updates: bool,
        updates: Mutex<Vec<UpdateItemInput>>,
    }

    #[async_trait]
    impl GetItem for FakeCourses {
        async fn get_item(&self, _: GetItemInput) -> Result<GetItemOutput, SdkError<GetItemError>> {
            let item = self
                .seats
                .map(|seats| Item::new().with_n(attr::SEATS_REMAINING, seats).into_inner());
            Ok(GetItemOutput::builder().set_item(item).build())
        }
    }

    #[async_trait]
    impl UpdateItem for FakeCourses {
        async fn update_item(&self, input: UpdateItemInput) -> Result<UpdateItemOutput, SdkError<UpdateItemError>> {
            self.updates.lock().unwrap().push(input);
            if self.refuse_updates {
                return Err(update_condition_failed());
            }
            let attributes = Item::new().with_n(attr::SEATS_REMAINING, self.seats.unwrap_or_default() - 1);
            Ok(UpdateItemOutput::builder().set_attributes(Some(attributes.into_inner())).build())
        }
    }

    fn fake(seats: Option<u32>, refuse_updates: bool) -> DdbSeatLedger<FakeCourses> {
        DdbSeatLedger::new(
            FakeCourses {
                seats,
                refuse_updates,
                updates: Mutex::new(vec![]),
            },
            "Courses",
        )
    }

    fn ledger(seats: u32) -> DdbSeatLedger<FakeCourses> {
        fake(Some(seats), false)
    }

    #[tokio::test]
    async fn reads_seat_count() {
        assert_eq!(ledger(7).seats(&Uuid::new_v4()).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn decrement_is_a_guarded_atomic_add() {
        let ledger = ledger(5);

        let remaining = ledger.adjust_seats(&Uuid::new_v4(), -1).await.unwrap();

        assert_eq!(remaining, 4);
        let updates = ledger.ddb.updates.lock().unwrap();
        let input = &updates[0];
        assert!(input.return_updated);
        assert_eq!(input.update_expression, "ADD SeatsRemaining :delta");
        assert_eq!(
            input.condition_expression.as_deref(),
            Some("attribute_exists(CourseId) AND SeatsRemaining >= :floor")
        );
        let values = input.expression_attribute_values.as_ref().unwrap();
        assert_eq!(values.get(":delta"), Some(&AttributeValue::N("-1".to_owned())));
        assert_eq!(values.get(":floor"), Some(&AttributeValue::N("1".to_owned())));
    }

    #[test]
    fn increment_has_no_floor() {
        let input = ledger(0).adjust_input(&Uuid::new_v4(), 1);

        let values = input.expression_attribute_values.unwrap();
        assert_eq!(values.get(":floor"), Some(&AttributeValue::N("0".to_owned())));
    }

    #[tokio::test]
    async fn refused_decrement_reports_the_remaining_seats() {
        let ledger = fake(Some(0), true);

        assert!(matches!(
            ledger.adjust_seats(&Uuid::new_v4(), -1).await,
            Err(SeatLedgerError::Capacity { remaining: 0, delta: -1 })
        ));
    }

    #[tokio::test]
    async fn refused_update_of_a_missing_course_is_not_found() {
        let ledger = fake(None, true);

        assert!(matches!(
            ledger.adjust_seats(&Uuid::new_v4(), 1).await,
            Err(SeatLedgerError::NotFound)
        ));
    }
}
