use std::collections::HashMap;
use std::fmt;

use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// A stored record, in the store's native attribute representation.
pub type Item = HashMap<String, AttributeValue>;

/// A partition or sort key value.
///
/// Keys only ever hold strings or integers, so anything else is rejected
/// when converting back from a native attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyValue {
    S(String),
    N(i64),
}

impl KeyValue {
    /// Returns true for the empty string. Numbers are never empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, KeyValue::S(s) if s.is_empty())
    }

    pub fn to_attribute(&self) -> AttributeValue {
        match self {
            KeyValue::S(s) => AttributeValue::S(s.clone()),
            KeyValue::N(n) => AttributeValue::N(n.to_string()),
        }
    }

    /// Converts a native attribute into a key value.
    pub fn from_attribute(value: &AttributeValue) -> Result<Self, ErrorKind> {
        match value {
            AttributeValue::S(s) => Ok(KeyValue::S(s.clone())),
            AttributeValue::N(n) => n
                .parse::<i64>()
                .map(KeyValue::N)
                .map_err(|_| ErrorKind::UnsupportedKeyValue(format!("non-integer number {n}"))),
            other => Err(ErrorKind::UnsupportedKeyValue(format!("{other:?}"))),
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::S(s) => f.write_str(s),
            KeyValue::N(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        KeyValue::S(value.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        KeyValue::S(value)
    }
}

impl From<&String> for KeyValue {
    fn from(value: &String) -> Self {
        KeyValue::S(value.clone())
    }
}

impl From<i64> for KeyValue {
    fn from(value: i64) -> Self {
        KeyValue::N(value)
    }
}

impl From<i32> for KeyValue {
    fn from(value: i32) -> Self {
        KeyValue::N(i64::from(value))
    }
}

impl From<u32> for KeyValue {
    fn from(value: u32) -> Self {
        KeyValue::N(i64::from(value))
    }
}

impl From<KeyValue> for AttributeValue {
    fn from(value: KeyValue) -> Self {
        match value {
            KeyValue::S(s) => AttributeValue::S(s),
            KeyValue::N(n) => AttributeValue::N(n.to_string()),
        }
    }
}

/// An operand for filter and condition expressions.
///
/// Unlike [`KeyValue`] this can carry any native attribute, so filters can
/// compare booleans, floats or sets.
#[derive(Debug, Clone, PartialEq)]
pub struct Value(AttributeValue);

impl Value {
    pub fn new(attribute: AttributeValue) -> Self {
        Self(attribute)
    }

    pub fn as_attribute(&self) -> &AttributeValue {
        &self.0
    }

    pub fn into_attribute(self) -> AttributeValue {
        self.0
    }
}

impl From<AttributeValue> for Value {
    fn from(value: AttributeValue) -> Self {
        Self(value)
    }
}

impl From<KeyValue> for Value {
    fn from(value: KeyValue) -> Self {
        Self(value.into())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self(AttributeValue::S(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self(AttributeValue::S(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self(AttributeValue::N(value.to_string()))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self(AttributeValue::N(value.to_string()))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self(AttributeValue::N(value.to_string()))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self(AttributeValue::N(value.to_string()))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self(AttributeValue::Bool(value))
    }
}
