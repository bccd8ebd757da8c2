use std::fmt;

use thiserror::Error;

use crate::store::StoreError;

/// Name of the public operation an error is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    NewClient,
    TableName,
    PartitionKey,
    SortKey,
    Index,
    Filter,
    AndFilter,
    OrFilter,
    Projection,
    Create,
    Get,
    Update,
    Upsert,
    Delete,
    Query,
    Scan,
    Count,
    CountWithLimit,
    BatchGet,
    BatchUpsert,
    BatchDelete,
    Unmarshal,
    Authorization,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::NewClient => "NewClient",
            Operation::TableName => "TableName",
            Operation::PartitionKey => "PartitionKey",
            Operation::SortKey => "SortKey",
            Operation::Index => "Index",
            Operation::Filter => "Filter",
            Operation::AndFilter => "AndFilter",
            Operation::OrFilter => "OrFilter",
            Operation::Projection => "Projection",
            Operation::Create => "Create",
            Operation::Get => "Get",
            Operation::Update => "Update",
            Operation::Upsert => "Upsert",
            Operation::Delete => "Delete",
            Operation::Query => "Query",
            Operation::Scan => "Scan",
            Operation::Count => "Count",
            Operation::CountWithLimit => "CountWithLimit",
            Operation::BatchGet => "BatchGet",
            Operation::BatchUpsert => "BatchUpsert",
            Operation::BatchDelete => "BatchDelete",
            Operation::Unmarshal => "Unmarshal",
            Operation::Authorization => "Authorization",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What went wrong, independent of the operation it happened in.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    // Builder and configuration errors
    #[error("table name can't be empty")]
    EmptyTableName,
    #[error("partition key can't be empty")]
    EmptyPartitionKey,
    #[error("sort key can't be empty")]
    MissingSortKey,
    #[error("sort key is not required")]
    UnexpectedSortKey,
    #[error("invalid AND/OR filter condition")]
    InvalidFilterCondition,
    #[error("IN condition needs at least one value")]
    EmptyInList,
    #[error("projection can't be empty")]
    EmptyProjection,
    #[error("invalid secondary index name: {0}")]
    UnknownIndex(String),
    #[error("duplicate secondary index name: {0}")]
    DuplicateIndex(String),
    #[error("partition key is missing")]
    MissingPartitionKey,
    #[error("region is missing")]
    MissingRegion,
    #[error("no discriminator attribute configured")]
    MissingDiscriminator,
    #[error("operation is not supported on a secondary index")]
    IndexNotSupported,
    #[error("unsupported key value: {0}")]
    UnsupportedKeyValue(String),
    #[error("validation failed: {0}")]
    Validation(String),

    // Store classification
    #[error("key doesn't exist")]
    KeyNotFound,
    #[error("duplicate item")]
    DuplicateItem,
    #[error("index doesn't exist")]
    IndexNotFound,
    #[error("internal server error")]
    InternalServerError,
    #[error("table/index doesn't exist")]
    ResourceNotFound,
    #[error("table doesn't exist")]
    TableNotFound,
    #[error("store request failed: {0}")]
    Store(String),

    // Output pipeline and workers
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("{0}")]
    Authorization(String),
    #[error("batch worker failed: {0}")]
    Worker(String),
}

/// An error wrapped with the name of the operation that raised it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{operation}(): {kind}")]
pub struct Error {
    pub operation: Operation,
    pub kind: ErrorKind,
}

impl Error {
    pub fn new(operation: Operation, kind: ErrorKind) -> Self {
        Self { operation, kind }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Classifies a store failure for the given operation.
    ///
    /// A failed conditional check means "duplicate item" for creates and
    /// "key doesn't exist" everywhere else, since those are the only
    /// conditions this crate attaches.
    pub fn from_store(operation: Operation, err: StoreError) -> Self {
        let kind = match err {
            StoreError::ConditionalCheckFailed if operation == Operation::Create => {
                ErrorKind::DuplicateItem
            }
            StoreError::ConditionalCheckFailed => ErrorKind::KeyNotFound,
            StoreError::DuplicateItem => ErrorKind::DuplicateItem,
            StoreError::IndexNotFound => ErrorKind::IndexNotFound,
            StoreError::InternalServerError => ErrorKind::InternalServerError,
            StoreError::ResourceNotFound => ErrorKind::ResourceNotFound,
            StoreError::TableNotFound => ErrorKind::TableNotFound,
            other => ErrorKind::Store(other.to_string()),
        };
        Self::new(operation, kind)
    }
}

/// Result type for dynoquery operations.
pub type Result<T> = std::result::Result<T, Error>;
