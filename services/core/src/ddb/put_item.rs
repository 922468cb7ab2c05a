use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::PutItemError;
use aws_sdk_dynamodb::model::{AttributeValue, Put};
use aws_sdk_dynamodb::output::PutItemOutput;
use aws_sdk_dynamodb::types::SdkError;
use typed_builder::TypedBuilder;

use super::adapter::Adapter;

#[derive(Debug, Clone, TypedBuilder)]
pub struct PutItemInput {
    #[builder(setter(into))]
    pub table_name: String,

    #[builder(setter(into))]
    pub item: HashMap<String, AttributeValue>,

    /// Usually `attribute_not_exists(..)` on the key, which turns the put into a create-only write.
    #[builder(default, setter(strip_option, into))]
    pub condition_expression: Option<String>,

    #[builder(default, setter(strip_option))]
    pub expression_attribute_values: Option<HashMap<String, AttributeValue>>,
}

impl From<PutItemInput> for Put {
    fn from(input: PutItemInput) -> Self {
        Put::builder()
            .table_name(input.table_name)
            .set_item(Some(input.item))
            .set_condition_expression(input.condition_expression)
            .set_expression_attribute_values(input.expression_attribute_values)
            .build()
    }
}

#[async_trait]
pub trait PutItem {
    async fn put_item(&self, input: PutItemInput) -> Result<PutItemOutput, SdkError<PutItemError>>;
}

#[async_trait]
impl PutItem for Adapter {
    async fn put_item(&self, input: PutItemInput) -> Result<PutItemOutput, SdkError<PutItemError>> {
        self.raw
            .put_item()
            .table_name(input.table_name)
            .set_item(Some(input.item))
            .set_condition_expression(input.condition_expression)
            .set_expression_attribute_values(input.expression_attribute_values)
            .send()
            .await
    }
}
