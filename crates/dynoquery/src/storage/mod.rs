//! Store backends.
//!
//! - `dynamodb` (default feature): AWS DynamoDB via `aws-sdk-dynamodb`
//! - `inmemory`: a map-backed store for tests and local development

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

pub mod inmemory;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbStore;
pub use inmemory::InMemoryStore;
