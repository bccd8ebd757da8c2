use std::collections::BTreeMap;

use aws_sdk_dynamodb::types::AttributeValue;

use crate::batch::WriteRequest;
use crate::expression::{Condition, KeyCondition, Projection};
use crate::pagination::{Cursor, Direction};
use crate::value::Item;

#[derive(Debug, Clone, PartialEq)]
pub struct GetItemRequest {
    pub table_name: String,
    pub key: Item,
    pub projection: Projection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PutItemRequest {
    pub table_name: String,
    pub item: Item,
    pub condition: Option<Condition>,
}

/// Sets `assignments` on the item addressed by `key`, creating it if absent.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateItemRequest {
    pub table_name: String,
    pub key: Item,
    pub assignments: Vec<(String, AttributeValue)>,
    pub condition: Option<Condition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteItemRequest {
    pub table_name: String,
    pub key: Item,
    pub condition: Option<Condition>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Select {
    #[default]
    Items,
    Count,
}

/// One page request of a query or scan.
///
/// Scans ignore `key_condition` and `direction`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadRequest {
    pub table_name: String,
    pub index_name: Option<String>,
    pub key_condition: Option<KeyCondition>,
    pub filter: Option<Condition>,
    pub projection: Projection,
    pub exclusive_start_key: Option<Cursor>,
    pub direction: Direction,
    pub limit: Option<usize>,
    pub select: Select,
}

impl ReadRequest {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            index_name: None,
            key_condition: None,
            filter: None,
            projection: Projection::all(),
            exclusive_start_key: None,
            direction: Direction::Forward,
            limit: None,
            select: Select::Items,
        }
    }
}

/// One page of a query or scan response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Item>,
    /// Items that matched the filter.
    pub count: usize,
    /// Items evaluated before the filter.
    pub scanned_count: usize,
    pub last_evaluated_key: Option<Cursor>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchGetRequest {
    pub keys: BTreeMap<String, Vec<Item>>,
    pub projection: Projection,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchGetOutput {
    pub items: Vec<Item>,
    pub unprocessed: BTreeMap<String, Vec<Item>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchWriteRequest {
    pub requests: BTreeMap<String, Vec<WriteRequest>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchWriteOutput {
    pub unprocessed: BTreeMap<String, Vec<WriteRequest>>,
}
