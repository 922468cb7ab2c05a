use std::str::FromStr;

use aws_sdk_dynamodb::Client as RawClient;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Invalid DynamoDB endpoint {0:?}.")]
    InvalidEndpoint(String),
}

/// Thin wrapper around the SDK client. Each DynamoDB operation used by the services is exposed through
/// its own trait (see the sibling modules), implemented here against the real client.
#[derive(Debug, Clone)]
pub struct Adapter {
    pub(crate) raw: RawClient,
}

impl Adapter {
    /// Builds a client from the shared AWS environment configuration, optionally pointing it at a custom
    /// endpoint (e.g. DynamoDB Local).
    pub async fn from_env(endpoint: Option<&str>) -> Result<Self, AdapterError> {
        let shared_config = aws_config::load_from_env().await;

        let dynamodb_config = match endpoint {
            Some(endpoint) => {
                let uri = http::Uri::from_str(endpoint).map_err(|_| AdapterError::InvalidEndpoint(endpoint.to_owned()))?;
                tracing::info!(%endpoint, "Using DynamoDB with custom endpoint.");
                aws_sdk_dynamodb::config::Builder::from(&shared_config)
                    .endpoint_resolver(aws_sdk_dynamodb::Endpoint::immutable(uri))
                    .build()
            }
            None => aws_sdk_dynamodb::config::Config::new(&shared_config),
        };

        Ok(RawClient::from_conf(dynamodb_config).into())
    }
}

impl From<RawClient> for Adapter {
    fn from(raw: RawClient) -> Self {
        Adapter { raw }
    }
}
