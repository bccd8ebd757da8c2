//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `StoreError` from `dynoquery_core::store`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::batch_get_item::BatchGetItemError;
use aws_sdk_dynamodb::operation::batch_write_item::BatchWriteItemError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use dynoquery_core::store::StoreError;

fn throughput() -> StoreError {
    StoreError::Throttled("throughput exceeded, please retry".to_string())
}

fn request_limit() -> StoreError {
    StoreError::Throttled("request limit exceeded, please retry".to_string())
}

/// Map a GetItem SDK error to StoreError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
) -> StoreError {
    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(_) => StoreError::ResourceNotFound,
        GetItemError::ProvisionedThroughputExceededException(_) => throughput(),
        GetItemError::RequestLimitExceeded(_) => request_limit(),
        GetItemError::InternalServerError(_) => StoreError::InternalServerError,
        err => StoreError::Other(format!("GetItem failed: {:?}", err)),
    }
}

/// Map a PutItem SDK error to StoreError.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
) -> StoreError {
    match err.into_service_error() {
        PutItemError::ConditionalCheckFailedException(_) => StoreError::ConditionalCheckFailed,
        PutItemError::ResourceNotFoundException(_) => StoreError::ResourceNotFound,
        PutItemError::ProvisionedThroughputExceededException(_) => throughput(),
        PutItemError::RequestLimitExceeded(_) => request_limit(),
        PutItemError::InternalServerError(_) => StoreError::InternalServerError,
        err => StoreError::Other(format!("PutItem failed: {:?}", err)),
    }
}

/// Map an UpdateItem SDK error to StoreError.
pub fn map_update_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<UpdateItemError, R>,
) -> StoreError {
    match err.into_service_error() {
        UpdateItemError::ConditionalCheckFailedException(_) => StoreError::ConditionalCheckFailed,
        UpdateItemError::ResourceNotFoundException(_) => StoreError::ResourceNotFound,
        UpdateItemError::ProvisionedThroughputExceededException(_) => throughput(),
        UpdateItemError::RequestLimitExceeded(_) => request_limit(),
        UpdateItemError::InternalServerError(_) => StoreError::InternalServerError,
        err => StoreError::Other(format!("UpdateItem failed: {:?}", err)),
    }
}

/// Map a DeleteItem SDK error to StoreError.
pub fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
) -> StoreError {
    match err.into_service_error() {
        DeleteItemError::ConditionalCheckFailedException(_) => StoreError::ConditionalCheckFailed,
        DeleteItemError::ResourceNotFoundException(_) => StoreError::ResourceNotFound,
        DeleteItemError::ProvisionedThroughputExceededException(_) => throughput(),
        DeleteItemError::RequestLimitExceeded(_) => request_limit(),
        DeleteItemError::InternalServerError(_) => StoreError::InternalServerError,
        err => StoreError::Other(format!("DeleteItem failed: {:?}", err)),
    }
}

/// Map a Query SDK error to StoreError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
) -> StoreError {
    match err.into_service_error() {
        QueryError::ResourceNotFoundException(_) => StoreError::ResourceNotFound,
        QueryError::ProvisionedThroughputExceededException(_) => throughput(),
        QueryError::RequestLimitExceeded(_) => request_limit(),
        QueryError::InternalServerError(_) => StoreError::InternalServerError,
        err => StoreError::Other(format!("Query failed: {:?}", err)),
    }
}

/// Map a Scan SDK error to StoreError.
pub fn map_scan_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<ScanError, R>,
) -> StoreError {
    match err.into_service_error() {
        ScanError::ResourceNotFoundException(_) => StoreError::ResourceNotFound,
        ScanError::ProvisionedThroughputExceededException(_) => throughput(),
        ScanError::RequestLimitExceeded(_) => request_limit(),
        ScanError::InternalServerError(_) => StoreError::InternalServerError,
        err => StoreError::Other(format!("Scan failed: {:?}", err)),
    }
}

/// Map a BatchGetItem SDK error to StoreError.
pub fn map_batch_get_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<BatchGetItemError, R>,
) -> StoreError {
    match err.into_service_error() {
        BatchGetItemError::ResourceNotFoundException(_) => StoreError::ResourceNotFound,
        BatchGetItemError::ProvisionedThroughputExceededException(_) => throughput(),
        BatchGetItemError::RequestLimitExceeded(_) => request_limit(),
        BatchGetItemError::InternalServerError(_) => StoreError::InternalServerError,
        err => StoreError::Other(format!("BatchGetItem failed: {:?}", err)),
    }
}

/// Map a BatchWriteItem SDK error to StoreError.
pub fn map_batch_write_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<BatchWriteItemError, R>,
) -> StoreError {
    match err.into_service_error() {
        BatchWriteItemError::ResourceNotFoundException(_) => StoreError::ResourceNotFound,
        BatchWriteItemError::ProvisionedThroughputExceededException(_) => throughput(),
        BatchWriteItemError::RequestLimitExceeded(_) => request_limit(),
        BatchWriteItemError::InternalServerError(_) => StoreError::InternalServerError,
        err => StoreError::Other(format!("BatchWriteItem failed: {:?}", err)),
    }
}
