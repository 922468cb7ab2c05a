use async_trait::async_trait;
use aws_sdk_dynamodb::error::{TransactWriteItemsError, TransactWriteItemsErrorKind};
use aws_sdk_dynamodb::model::TransactWriteItem;
use aws_sdk_dynamodb::output::TransactWriteItemsOutput;
use aws_sdk_dynamodb::types::SdkError;
use typed_builder::TypedBuilder;

use super::adapter::Adapter;
use super::delete_item::DeleteItemInput;
use super::put_item::PutItemInput;
use super::update_item::UpdateItemInput;

/// One action of a write transaction, described with the same inputs as the single-item operations.
#[derive(Debug, Clone)]
pub enum TransactWrite {
    Put(PutItemInput),
    Update(UpdateItemInput),
    Delete(DeleteItemInput),
}

impl From<TransactWrite> for TransactWriteItem {
    fn from(write: TransactWrite) -> Self {
        let builder = TransactWriteItem::builder();
        match write {
            TransactWrite::Put(input) => builder.put(input.into()),
            TransactWrite::Update(input) => builder.update(input.into()),
            TransactWrite::Delete(input) => builder.delete(input.into()),
        }
        .build()
    }
}

/// All-or-nothing writes: either every action and its condition succeed, or nothing is written.
#[derive(Debug, Clone, TypedBuilder)]
pub struct TransactWriteItemsInput {
    pub writes: Vec<TransactWrite>,
}

/// For a transaction cancelled by DynamoDB, tells for each action in request order whether its condition
/// failed. `None` for any other error.
pub fn failed_conditions(err: &SdkError<TransactWriteItemsError>) -> Option<Vec<bool>> {
    match err {
        SdkError::ServiceError {
            err:
                TransactWriteItemsError {
                    kind: TransactWriteItemsErrorKind::TransactionCanceledException(cancelled),
                    ..
                },
            ..
        } => Some(
            cancelled
                .cancellation_reasons()
                .unwrap_or_default()
                .iter()
                .map(|reason| reason.code() == Some("ConditionalCheckFailed"))
                .collect(),
        ),
        _ => None,
    }
}

#[async_trait]
pub trait TransactWriteItems {
    async fn transact_write_items(
        &self,
        input: TransactWriteItemsInput,
    ) -> Result<TransactWriteItemsOutput, SdkError<TransactWriteItemsError>>;
}

#[async_trait]
impl TransactWriteItems for Adapter {
    async fn transact_write_items(
        &self,
        input: TransactWriteItemsInput,
    ) -> Result<TransactWriteItemsOutput, SdkError<TransactWriteItemsError>> {
        self.raw
            .transact_write_items()
            .set_transact_items(Some(input.writes.into_iter().map(TransactWriteItem::from).collect()))
            .send()
            .await
    }
}
