//! Conversions between store request types and SDK request types.

use std::collections::{BTreeMap, HashMap};

use aws_sdk_dynamodb::types::{
    DeleteRequest, KeysAndAttributes, PutRequest, WriteRequest as SdkWriteRequest,
};
use dynoquery_core::batch::WriteRequest;
use dynoquery_core::expression::{ExpressionBuilder, Projection};
use dynoquery_core::store::{StoreError, StoreResult};
use dynoquery_core::Item;

fn invalid(err: impl std::fmt::Display) -> StoreError {
    StoreError::Validation(err.to_string())
}

pub fn to_sdk_write(request: WriteRequest) -> StoreResult<SdkWriteRequest> {
    let request = match request {
        WriteRequest::Put(item) => SdkWriteRequest::builder()
            .put_request(
                PutRequest::builder()
                    .set_item(Some(item))
                    .build()
                    .map_err(invalid)?,
            )
            .build(),
        WriteRequest::Delete(key) => SdkWriteRequest::builder()
            .delete_request(
                DeleteRequest::builder()
                    .set_key(Some(key))
                    .build()
                    .map_err(invalid)?,
            )
            .build(),
    };
    Ok(request)
}

/// Converts a write returned as unprocessed back into a store request.
/// Entries carrying neither a put nor a delete are dropped.
pub fn from_sdk_write(request: SdkWriteRequest) -> Option<WriteRequest> {
    if let Some(put) = request.put_request {
        return Some(WriteRequest::Put(put.item));
    }
    request
        .delete_request
        .map(|delete| WriteRequest::Delete(delete.key))
}

pub fn to_sdk_writes(
    requests: BTreeMap<String, Vec<WriteRequest>>,
) -> StoreResult<HashMap<String, Vec<SdkWriteRequest>>> {
    requests
        .into_iter()
        .map(|(table, writes)| {
            let writes = writes
                .into_iter()
                .map(to_sdk_write)
                .collect::<StoreResult<Vec<_>>>()?;
            Ok((table, writes))
        })
        .collect()
}

pub fn from_sdk_writes(
    unprocessed: Option<HashMap<String, Vec<SdkWriteRequest>>>,
) -> BTreeMap<String, Vec<WriteRequest>> {
    unprocessed
        .unwrap_or_default()
        .into_iter()
        .map(|(table, writes)| {
            (
                table,
                writes.into_iter().filter_map(from_sdk_write).collect(),
            )
        })
        .collect()
}

pub fn to_keys_and_attributes(
    keys: BTreeMap<String, Vec<Item>>,
    projection: &Projection,
) -> StoreResult<HashMap<String, KeysAndAttributes>> {
    keys.into_iter()
        .map(|(table, keys)| {
            let mut expressions = ExpressionBuilder::new();
            let projection = expressions.projection(projection);
            let placeholders = expressions.finish();

            let request = KeysAndAttributes::builder()
                .set_keys(Some(keys))
                .set_projection_expression(projection)
                .set_expression_attribute_names(placeholders.names)
                .build()
                .map_err(invalid)?;
            Ok((table, request))
        })
        .collect()
}

pub fn from_keys_and_attributes(
    unprocessed: Option<HashMap<String, KeysAndAttributes>>,
) -> BTreeMap<String, Vec<Item>> {
    unprocessed
        .unwrap_or_default()
        .into_iter()
        .map(|(table, request)| (table, request.keys))
        .collect()
}
