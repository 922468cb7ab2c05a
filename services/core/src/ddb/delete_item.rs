use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DeleteItemError;
use aws_sdk_dynamodb::model::{AttributeValue, Delete};
use aws_sdk_dynamodb::output::DeleteItemOutput;
use aws_sdk_dynamodb::types::SdkError;
use typed_builder::TypedBuilder;

use super::adapter::Adapter;

#[derive(TypedBuilder, Clone, Debug)]
pub struct DeleteItemInput {
    #[builder(setter(into))]
    pub table_name: String,

    #[builder(setter(into))]
    pub key: HashMap<String, AttributeValue>,

    /// `attribute_exists(..)` on the key makes deleting a missing item fail instead of silently succeeding.
    #[builder(default, setter(strip_option, into))]
    pub condition_expression: Option<String>,

    #[builder(default, setter(strip_option))]
    pub expression_attribute_values: Option<HashMap<String, AttributeValue>>,
}

impl From<DeleteItemInput> for Delete {
    fn from(input: DeleteItemInput) -> Self {
        Delete::builder()
            .table_name(input.table_name)
            .set_key(Some(input.key))
            .set_condition_expression(input.condition_expression)
            .set_expression_attribute_values(input.expression_attribute_values)
            .build()
    }
}

#[async_trait]
pub trait DeleteItem {
    async fn delete_item(&self, input: DeleteItemInput) -> Result<DeleteItemOutput, SdkError<DeleteItemError>>;
}

#[async_trait]
impl DeleteItem for Adapter {
    async fn delete_item(&self, input: DeleteItemInput) -> Result<DeleteItemOutput, SdkError<DeleteItemError>> {
        self.raw
            .delete_item()
            .table_name(input.table_name)
            .set_key(Some(input.key))
            .set_condition_expression(input.condition_expression)
            .set_expression_attribute_values(input.expression_attribute_values)
            .send()
            .await
    }
}
