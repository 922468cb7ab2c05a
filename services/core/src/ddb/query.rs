use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::QueryError;
use aws_sdk_dynamodb::model::AttributeValue;
use aws_sdk_dynamodb::output::QueryOutput;
use aws_sdk_dynamodb::types::SdkError;
use typed_builder::TypedBuilder;

use super::adapter::Adapter;

#[derive(Debug, Clone, TypedBuilder)]
pub struct QueryInput {
    #[builder(setter(into))]
    pub table_name: String,

    #[builder(default)]
    pub exclusive_start_key: Option<HashMap<String, AttributeValue>>,

    #[builder(setter(into))]
    pub key_condition_expression: String,

    #[builder(default, setter(strip_option, into))]
    pub filter_expression: Option<String>,

    #[builder(default, setter(strip_option))]
    pub expression_attribute_values: Option<HashMap<String, AttributeValue>>,

    /// Strongly consistent reads see every write acknowledged before the query started.
    #[builder(default = false)]
    pub consistent_read: bool,
}

#[async_trait]
pub trait Query {
    async fn query(&self, input: QueryInput) -> Result<QueryOutput, SdkError<QueryError>>;
}

#[async_trait]
impl Query for Adapter {
    async fn query(&self, input: QueryInput) -> Result<QueryOutput, SdkError<QueryError>> {
        self.raw
            .query()
            .table_name(input.table_name)
            .set_exclusive_start_key(input.exclusive_start_key)
            .set_filter_expression(input.filter_expression)
            .set_expression_attribute_values(input.expression_attribute_values)
            .consistent_read(input.consistent_read)
            .key_condition_expression(input.key_condition_expression)
            .send()
            .await
    }
}
