//! Typed access to raw DynamoDB items.
//!
//! Repositories describe their records as flat maps of `S`/`N` attributes. `Item` builds those maps and reads
//! them back with errors that name the offending attribute, so a malformed record surfaces as a datastore error
//! instead of a panic.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use aws_sdk_dynamodb::model::AttributeValue;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq)]
pub enum ItemError {
    #[error("Attribute {0:?} is missing.")]
    Missing(String),

    #[error("Attribute {0:?} has an unexpected type.")]
    UnexpectedType(String),

    #[error("Attribute {name:?} could not be parsed: {reason}.")]
    Parse { name: String, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item(HashMap<String, AttributeValue>);

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_s(mut self, name: &str, value: impl Into<String>) -> Self {
        self.0.insert(name.to_owned(), AttributeValue::S(value.into()));
        self
    }

    pub fn with_n(mut self, name: &str, value: impl Display) -> Self {
        self.0.insert(name.to_owned(), AttributeValue::N(value.to_string()));
        self
    }

    pub fn with_uuid(self, name: &str, value: &Uuid) -> Self {
        self.with_s(name, value.to_string())
    }

    /// Timestamps are stored as RFC 3339 strings so they sort lexicographically.
    pub fn with_timestamp(self, name: &str, value: &DateTime<Utc>) -> Self {
        self.with_s(name, value.to_rfc3339())
    }

    pub fn s(&self, name: &str) -> Result<&str, ItemError> {
        match self.0.get(name) {
            Some(AttributeValue::S(value)) => Ok(value.as_str()),
            Some(_) => Err(ItemError::UnexpectedType(name.to_owned())),
            None => Err(ItemError::Missing(name.to_owned())),
        }
    }

    pub fn n<T>(&self, name: &str) -> Result<T, ItemError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.0.get(name) {
            Some(AttributeValue::N(value)) => value.parse::<T>().map_err(|e| ItemError::Parse {
                name: name.to_owned(),
                reason: e.to_string(),
            }),
            Some(_) => Err(ItemError::UnexpectedType(name.to_owned())),
            None => Err(ItemError::Missing(name.to_owned())),
        }
    }

    pub fn uuid(&self, name: &str) -> Result<Uuid, ItemError> {
        Uuid::parse_str(self.s(name)?).map_err(|e| ItemError::Parse {
            name: name.to_owned(),
            reason: e.to_string(),
        })
    }

    pub fn timestamp(&self, name: &str) -> Result<DateTime<Utc>, ItemError> {
        DateTime::parse_from_rfc3339(self.s(name)?)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| ItemError::Parse {
                name: name.to_owned(),
                reason: e.to_string(),
            })
    }

    pub fn into_inner(self) -> HashMap<String, AttributeValue> {
        self.0
    }
}

impl From<HashMap<String, AttributeValue>> for Item {
    fn from(raw: HashMap<String, AttributeValue>) -> Self {
        Item(raw)
    }
}

impl From<Item> for HashMap<String, AttributeValue> {
    fn from(item: Item) -> Self {
        item.0
    }
}
