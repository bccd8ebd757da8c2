//! Output formatting functions.

pub mod json;
pub mod pretty;

use std::collections::BTreeMap;

use dynoquery::{Counts, Error, ErrorKind, Item, KeyValue, Operation, Output};
use serde::Serialize;

use crate::cli::OutputFormat;

/// Items of a read, converted to plain JSON.
#[derive(Debug, Serialize)]
pub struct ItemsOutput {
    pub items: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_evaluated_key: Option<BTreeMap<String, KeyValue>>,
}

impl ItemsOutput {
    pub fn from_output(output: &Output) -> dynoquery::Result<Self> {
        Ok(Self {
            items: output
                .items()
                .iter()
                .map(item_to_json)
                .collect::<dynoquery::Result<_>>()?,
            last_evaluated_key: output.last_evaluated_key()?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CountOutput {
    pub total: usize,
    pub filtered: usize,
}

impl From<Counts> for CountOutput {
    fn from(counts: Counts) -> Self {
        Self {
            total: counts.total,
            filtered: counts.filtered,
        }
    }
}

/// Converts an item to JSON.
pub fn item_to_json(item: &Item) -> dynoquery::Result<serde_json::Value> {
    serde_dynamo::from_item(item.clone()).map_err(|e| {
        Error::new(Operation::Unmarshal, ErrorKind::Serialization(e.to_string()))
    })
}

/// Format a value for output.
pub fn format_output<T: Serialize>(value: &T, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_json(value),
        OutputFormat::Pretty => serde_json::to_string_pretty(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::types::AttributeValue;
    use dynoquery::{Cursor, Value};

    use super::*;

    fn item() -> Item {
        Item::from([
            ("pk".to_string(), Value::from("room#1").into_attribute()),
            ("size".to_string(), Value::from(4).into_attribute()),
        ])
    }

    #[test]
    fn test_item_to_json() {
        assert_eq!(
            item_to_json(&item()).unwrap(),
            serde_json::json!({"pk": "room#1", "size": 4})
        );
    }

    #[test]
    fn test_unconvertible_item_is_an_error() {
        let mut bad = item();
        bad.insert("size".to_string(), AttributeValue::N("four".to_string()));

        let err = item_to_json(&bad).unwrap_err();
        assert_eq!(err.operation, Operation::Unmarshal);
        assert!(matches!(err.kind, ErrorKind::Serialization(_)));

        let output = Output::new(vec![item(), bad], None);
        assert!(ItemsOutput::from_output(&output).is_err());
    }

    #[test]
    fn test_items_output_includes_cursor() {
        let cursor = Cursor::from_key_values([("pk", KeyValue::from("room#1"))]);
        let output = Output::new(vec![item()], Some(cursor));

        let rendered = format_output(
            &ItemsOutput::from_output(&output).unwrap(),
            OutputFormat::Json,
        );
        assert_eq!(
            rendered,
            r#"{"items":[{"pk":"room#1","size":4}],"last_evaluated_key":{"pk":"room#1"}}"#
        );
    }

    #[test]
    fn test_items_output_omits_missing_cursor() {
        let output = Output::new(Vec::new(), None);
        let rendered = format_output(
            &ItemsOutput::from_output(&output).unwrap(),
            OutputFormat::Json,
        );
        assert_eq!(rendered, r#"{"items":[]}"#);
    }
}
