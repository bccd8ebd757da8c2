//! Caller-supplied validation and authorization hooks.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Error type returned by hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Checked before a record is written by create, upsert or batch upsert.
pub trait Validate {
    fn validate(&self) -> Result<(), HookError>;
}

/// Runs after records are fetched and deserialized.
///
/// For collections the hook runs once for the whole container, not per
/// record.
#[async_trait]
pub trait Authorize: Send {
    async fn authorize(&mut self) -> Result<(), HookError>;
}

/// A container that [`crate::Output::unmarshal`] can build.
pub trait Records: Authorize + Sized {
    type Record: DeserializeOwned;

    fn from_records(records: Vec<Self::Record>) -> Self;
}
