//! DynamoDB client construction.

use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::Client;

use crate::config::ClientConfig;

/// Creates a DynamoDB client for the configured region and endpoint.
///
/// Credentials come from the default provider chain. Throttled and
/// transient failures are retried by the SDK up to `max_retries` attempts.
pub async fn create_client(config: &ClientConfig) -> Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .retry_config(RetryConfig::standard().with_max_attempts(config.max_retries.max(1)));

    if let Some(endpoint) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    let sdk_config = loader.load().await;
    Client::new(&sdk_config)
}
