//! DynamoDB storage backend.
//!
//! Implements the `Store` trait with `aws-sdk-dynamodb`, rendering key
//! conditions, filters and projections into expressions with placeholder
//! names and values.

mod client;
mod conversions;
mod error;
mod store;

pub use client::create_client;
pub use store::DynamoDbStore;
