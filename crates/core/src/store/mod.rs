mod error;
mod traits;
mod types;

pub use error::{StoreError, StoreResult};
pub use traits::Store;
pub use types::{
    BatchGetOutput, BatchGetRequest, BatchWriteOutput, BatchWriteRequest, DeleteItemRequest,
    GetItemRequest, Page, PutItemRequest, ReadRequest, Select, UpdateItemRequest,
};
