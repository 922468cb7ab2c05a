//! DynamoDB service errors for the fake clients in tests.

use aws_sdk_dynamodb::error::{
    ConditionalCheckFailedException, TransactWriteItemsError, TransactWriteItemsErrorKind,
    TransactionCanceledException, UpdateItemError, UpdateItemErrorKind,
};
use aws_sdk_dynamodb::model::CancellationReason;
use aws_sdk_dynamodb::types::SdkError;
use aws_smithy_http::body::SdkBody;
use aws_smithy_http::operation;

fn service_error<E>(err: E) -> SdkError<E> {
    SdkError::ServiceError {
        err,
        raw: operation::Response::new(http::Response::new(SdkBody::empty())),
    }
}

pub fn update_condition_failed() -> SdkError<UpdateItemError> {
    service_error(UpdateItemError::new(
        UpdateItemErrorKind::ConditionalCheckFailedException(ConditionalCheckFailedException::builder().build()),
        aws_smithy_types::Error::builder()
            .code("ConditionalCheckFailedException")
            .build(),
    ))
}

/// A cancelled transaction where the actions flagged `true` failed their condition.
pub fn transaction_cancelled(failed: &[bool]) -> SdkError<TransactWriteItemsError> {
    let cancelled = failed
        .iter()
        .map(|&failed| if failed { "ConditionalCheckFailed" } else { "None" })
        .fold(TransactionCanceledException::builder(), |builder, code| {
            builder.cancellation_reasons(CancellationReason::builder().code(code).build())
        })
        .build();

    service_error(TransactWriteItemsError::new(
        TransactWriteItemsErrorKind::TransactionCanceledException(cancelled),
        aws_smithy_types::Error::builder()
            .code("TransactionCanceledException")
            .build(),
    ))
}
