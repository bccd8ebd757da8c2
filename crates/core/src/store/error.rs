use thiserror::Error;

/// Failures reported by a store backend, before they are attached to an
/// operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("conditional check failed")]
    ConditionalCheckFailed,
    #[error("duplicate item")]
    DuplicateItem,
    #[error("index not found")]
    IndexNotFound,
    #[error("internal server error")]
    InternalServerError,
    #[error("resource not found")]
    ResourceNotFound,
    #[error("table not found")]
    TableNotFound,
    #[error("throughput exceeded: {0}")]
    Throttled(String),
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("{0}")]
    Other(String),
}

/// Result type for store calls.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
