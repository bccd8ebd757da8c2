use async_trait::async_trait;

use crate::value::Item;

use super::types::{
    BatchGetOutput, BatchGetRequest, BatchWriteOutput, BatchWriteRequest, DeleteItemRequest,
    GetItemRequest, Page, PutItemRequest, ReadRequest, UpdateItemRequest,
};
use super::StoreResult;

/// The operations dynoquery needs from a key-value store.
#[async_trait]
pub trait Store: Send + Sync {
    /// Gets a single item by its full primary key.
    async fn get_item(&self, request: GetItemRequest) -> StoreResult<Option<Item>>;

    /// Writes an item, optionally guarded by a condition.
    async fn put_item(&self, request: PutItemRequest) -> StoreResult<()>;

    /// Sets attributes on an item.
    async fn update_item(&self, request: UpdateItemRequest) -> StoreResult<()>;

    /// Deletes an item, optionally guarded by a condition.
    async fn delete_item(&self, request: DeleteItemRequest) -> StoreResult<()>;

    /// Fetches one page of a key-condition query.
    async fn query(&self, request: &ReadRequest) -> StoreResult<Page>;

    /// Fetches one page of a full table or index scan.
    async fn scan(&self, request: &ReadRequest) -> StoreResult<Page>;

    /// Reads up to one chunk of keys, reporting the keys it did not get to.
    async fn batch_get(&self, request: BatchGetRequest) -> StoreResult<BatchGetOutput>;

    /// Applies up to one chunk of puts and deletes, reporting leftovers.
    async fn batch_write(&self, request: BatchWriteRequest) -> StoreResult<BatchWriteOutput>;
}
