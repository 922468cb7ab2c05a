use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::UpdateItemError;
use aws_sdk_dynamodb::model::{AttributeValue, ReturnValue, Update};
use aws_sdk_dynamodb::output::UpdateItemOutput;
use aws_sdk_dynamodb::types::SdkError;
use typed_builder::TypedBuilder;

use super::adapter::Adapter;

#[derive(Debug, Clone, TypedBuilder)]
pub struct UpdateItemInput {
    #[builder(setter(into))]
    pub table_name: String,

    #[builder(setter(into))]
    pub key: HashMap<String, AttributeValue>,

    #[builder(setter(into))]
    pub update_expression: String,

    #[builder(default, setter(strip_option, into))]
    pub condition_expression: Option<String>,

    #[builder(default, setter(strip_option))]
    pub expression_attribute_names: Option<HashMap<String, String>>,

    #[builder(default, setter(strip_option))]
    pub expression_attribute_values: Option<HashMap<String, AttributeValue>>,

    /// Asks for the updated attributes in `UpdateItemOutput::attributes`. Ignored inside a transaction.
    #[builder(default)]
    pub return_updated: bool,
}

impl From<UpdateItemInput> for Update {
    fn from(input: UpdateItemInput) -> Self {
        Update::builder()
            .table_name(input.table_name)
            .set_key(Some(input.key))
            .update_expression(input.update_expression)
            .set_condition_expression(input.condition_expression)
            .set_expression_attribute_names(input.expression_attribute_names)
            .set_expression_attribute_values(input.expression_attribute_values)
            .build()
    }
}

#[async_trait]
pub trait UpdateItem {
    async fn update_item(&self, input: UpdateItemInput) -> Result<UpdateItemOutput, SdkError<UpdateItemError>>;
}

#[async_trait]
impl UpdateItem for Adapter {
    async fn update_item(&self, input: UpdateItemInput) -> Result<UpdateItemOutput, SdkError<UpdateItemError>> {
        let return_values = input.return_updated.then(|| ReturnValue::UpdatedNew);

        self.raw
            .update_item()
            .table_name(input.table_name)
            .set_key(Some(input.key))
            .update_expression(input.update_expression)
            .set_condition_expression(input.condition_expression)
            .set_expression_attribute_names(input.expression_attribute_names)
            .set_expression_attribute_values(input.expression_attribute_values)
            .set_return_values(return_values)
            .send()
            .await
    }
}
