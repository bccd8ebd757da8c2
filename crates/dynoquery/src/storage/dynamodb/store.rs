//! DynamoDB store implementation.
//!
//! Implements the `Store` trait from `dynoquery_core::store` using DynamoDB.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::Select as SdkSelect;
use aws_sdk_dynamodb::Client;

use dynoquery_core::expression::ExpressionBuilder;
use dynoquery_core::pagination::Cursor;
use dynoquery_core::store::{
    BatchGetOutput, BatchGetRequest, BatchWriteOutput, BatchWriteRequest, DeleteItemRequest,
    GetItemRequest, Page, PutItemRequest, ReadRequest, Select, Store, StoreError, StoreResult,
    UpdateItemRequest,
};
use dynoquery_core::Item;

use super::client::create_client;
use super::conversions::{
    from_keys_and_attributes, from_sdk_writes, to_keys_and_attributes, to_sdk_writes,
};
use super::error::{
    map_batch_get_error, map_batch_write_error, map_delete_item_error, map_get_item_error,
    map_put_item_error, map_query_error, map_scan_error, map_update_item_error,
};
use crate::config::ClientConfig;

/// Rendered expressions of one read request.
struct ReadExpressions {
    key_condition: Option<String>,
    filter: Option<String>,
    projection: Option<String>,
    names: Option<HashMap<String, String>>,
    values: Option<Item>,
}

fn render_read(request: &ReadRequest, with_key: bool) -> ReadExpressions {
    let mut expressions = ExpressionBuilder::new();
    let key_condition = request
        .key_condition
        .as_ref()
        .filter(|_| with_key)
        .map(|key| expressions.key_condition(key));
    let filter = request
        .filter
        .as_ref()
        .map(|condition| expressions.condition(condition));
    let projection = match request.select {
        Select::Items => expressions.projection(&request.projection),
        Select::Count => None,
    };
    let placeholders = expressions.finish();

    ReadExpressions {
        key_condition,
        filter,
        projection,
        names: placeholders.names,
        values: placeholders.values,
    }
}

fn select(request: &ReadRequest) -> Option<SdkSelect> {
    match request.select {
        Select::Items => None,
        Select::Count => Some(SdkSelect::Count),
    }
}

fn page_limit(request: &ReadRequest) -> Option<i32> {
    request
        .limit
        .map(|limit| i32::try_from(limit).unwrap_or(i32::MAX))
}

fn to_count(value: i32) -> usize {
    usize::try_from(value).unwrap_or_default()
}

/// DynamoDB-backed [`Store`].
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: Client,
}

impl DynamoDbStore {
    /// Creates a store with the given DynamoDB client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a store with a client built from `config`.
    pub async fn connect(config: &ClientConfig) -> Self {
        Self::new(create_client(config).await)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Store for DynamoDbStore {
    async fn get_item(&self, request: GetItemRequest) -> StoreResult<Option<Item>> {
        let mut expressions = ExpressionBuilder::new();
        let projection = expressions.projection(&request.projection);
        let placeholders = expressions.finish();

        let result = self
            .client
            .get_item()
            .table_name(request.table_name)
            .set_key(Some(request.key))
            .set_projection_expression(projection)
            .set_expression_attribute_names(placeholders.names)
            .send()
            .await
            .map_err(map_get_item_error)?;

        Ok(result.item)
    }

    async fn put_item(&self, request: PutItemRequest) -> StoreResult<()> {
        let mut expressions = ExpressionBuilder::new();
        let condition = request
            .condition
            .as_ref()
            .map(|condition| expressions.condition(condition));
        let placeholders = expressions.finish();

        self.client
            .put_item()
            .table_name(request.table_name)
            .set_item(Some(request.item))
            .set_condition_expression(condition)
            .set_expression_attribute_names(placeholders.names)
            .set_expression_attribute_values(placeholders.values)
            .send()
            .await
            .map_err(map_put_item_error)?;

        Ok(())
    }

    async fn update_item(&self, request: UpdateItemRequest) -> StoreResult<()> {
        if request.assignments.is_empty() {
            return Err(StoreError::Validation(
                "update has no attributes to set".to_string(),
            ));
        }

        let mut expressions = ExpressionBuilder::new();
        let update = expressions.update(&request.assignments);
        let condition = request
            .condition
            .as_ref()
            .map(|condition| expressions.condition(condition));
        let placeholders = expressions.finish();

        self.client
            .update_item()
            .table_name(request.table_name)
            .set_key(Some(request.key))
            .update_expression(update)
            .set_condition_expression(condition)
            .set_expression_attribute_names(placeholders.names)
            .set_expression_attribute_values(placeholders.values)
            .send()
            .await
            .map_err(map_update_item_error)?;

        Ok(())
    }

    async fn delete_item(&self, request: DeleteItemRequest) -> StoreResult<()> {
        let mut expressions = ExpressionBuilder::new();
        let condition = request
            .condition
            .as_ref()
            .map(|condition| expressions.condition(condition));
        let placeholders = expressions.finish();

        self.client
            .delete_item()
            .table_name(request.table_name)
            .set_key(Some(request.key))
            .set_condition_expression(condition)
            .set_expression_attribute_names(placeholders.names)
            .set_expression_attribute_values(placeholders.values)
            .send()
            .await
            .map_err(map_delete_item_error)?;

        Ok(())
    }

    async fn query(&self, request: &ReadRequest) -> StoreResult<Page> {
        let expressions = render_read(request, true);

        let result = self
            .client
            .query()
            .table_name(&request.table_name)
            .set_index_name(request.index_name.clone())
            .set_key_condition_expression(expressions.key_condition)
            .set_filter_expression(expressions.filter)
            .set_projection_expression(expressions.projection)
            .set_expression_attribute_names(expressions.names)
            .set_expression_attribute_values(expressions.values)
            .set_exclusive_start_key(request.exclusive_start_key.clone().map(Cursor::into_item))
            .scan_index_forward(request.direction.is_forward())
            .set_limit(page_limit(request))
            .set_select(select(request))
            .send()
            .await
            .map_err(map_query_error)?;

        Ok(Page {
            count: to_count(result.count),
            scanned_count: to_count(result.scanned_count),
            last_evaluated_key: result
                .last_evaluated_key
                .filter(|key| !key.is_empty())
                .map(Cursor::new),
            items: result.items.unwrap_or_default(),
        })
    }

    async fn scan(&self, request: &ReadRequest) -> StoreResult<Page> {
        let expressions = render_read(request, false);

        let result = self
            .client
            .scan()
            .table_name(&request.table_name)
            .set_index_name(request.index_name.clone())
            .set_filter_expression(expressions.filter)
            .set_projection_expression(expressions.projection)
            .set_expression_attribute_names(expressions.names)
            .set_expression_attribute_values(expressions.values)
            .set_exclusive_start_key(request.exclusive_start_key.clone().map(Cursor::into_item))
            .set_limit(page_limit(request))
            .set_select(select(request))
            .send()
            .await
            .map_err(map_scan_error)?;

        Ok(Page {
            count: to_count(result.count),
            scanned_count: to_count(result.scanned_count),
            last_evaluated_key: result
                .last_evaluated_key
                .filter(|key| !key.is_empty())
                .map(Cursor::new),
            items: result.items.unwrap_or_default(),
        })
    }

    async fn batch_get(&self, request: BatchGetRequest) -> StoreResult<BatchGetOutput> {
        let request_items = to_keys_and_attributes(request.keys, &request.projection)?;

        let result = self
            .client
            .batch_get_item()
            .set_request_items(Some(request_items))
            .send()
            .await
            .map_err(map_batch_get_error)?;

        Ok(BatchGetOutput {
            items: result
                .responses
                .unwrap_or_default()
                .into_values()
                .flatten()
                .collect(),
            unprocessed: from_keys_and_attributes(result.unprocessed_keys),
        })
    }

    async fn batch_write(&self, request: BatchWriteRequest) -> StoreResult<BatchWriteOutput> {
        let request_items = to_sdk_writes(request.requests)?;

        let result = self
            .client
            .batch_write_item()
            .set_request_items(Some(request_items))
            .send()
            .await
            .map_err(map_batch_write_error)?;

        Ok(BatchWriteOutput {
            unprocessed: from_sdk_writes(result.unprocessed_items),
        })
    }
}
