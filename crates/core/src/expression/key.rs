use crate::error::ErrorKind;
use crate::value::{Item, KeyValue};

/// Comparator applied to a sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortCondition {
    Equal(KeyValue),
    BeginsWith(String),
    Between(KeyValue, KeyValue),
    LessThan(KeyValue),
    LessThanOrEqual(KeyValue),
    GreaterThan(KeyValue),
    GreaterThanOrEqual(KeyValue),
}

impl SortCondition {
    pub fn equal(value: impl Into<KeyValue>) -> Self {
        SortCondition::Equal(value.into())
    }

    pub fn begins_with(prefix: impl Into<String>) -> Self {
        SortCondition::BeginsWith(prefix.into())
    }

    pub fn between(low: impl Into<KeyValue>, high: impl Into<KeyValue>) -> Self {
        SortCondition::Between(low.into(), high.into())
    }

    pub fn less_than(value: impl Into<KeyValue>) -> Self {
        SortCondition::LessThan(value.into())
    }

    pub fn less_or_equal(value: impl Into<KeyValue>) -> Self {
        SortCondition::LessThanOrEqual(value.into())
    }

    pub fn greater_than(value: impl Into<KeyValue>) -> Self {
        SortCondition::GreaterThan(value.into())
    }

    pub fn greater_or_equal(value: impl Into<KeyValue>) -> Self {
        SortCondition::GreaterThanOrEqual(value.into())
    }

    /// The value this comparator pins the sort key to when it is used to
    /// address a single item. For ranges this is the lower bound.
    pub fn anchor(&self) -> KeyValue {
        match self {
            SortCondition::Equal(v)
            | SortCondition::LessThan(v)
            | SortCondition::LessThanOrEqual(v)
            | SortCondition::GreaterThan(v)
            | SortCondition::GreaterThanOrEqual(v) => v.clone(),
            SortCondition::BeginsWith(prefix) => KeyValue::S(prefix.clone()),
            SortCondition::Between(low, _) => low.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SortCondition::BeginsWith(prefix) => prefix.is_empty(),
            SortCondition::Between(low, high) => low.is_empty() || high.is_empty(),
            other => other.anchor().is_empty(),
        }
    }
}

/// A sort key comparator bound to its attribute name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKeyCondition {
    pub attribute: String,
    pub condition: SortCondition,
}

/// Partition key equality plus an optional sort key comparator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCondition {
    pub partition_key: String,
    pub partition_value: KeyValue,
    pub sort: Option<SortKeyCondition>,
}

impl KeyCondition {
    /// Creates a key condition, rejecting empty partition values.
    pub fn new(
        partition_key: impl Into<String>,
        partition_value: impl Into<KeyValue>,
    ) -> Result<Self, ErrorKind> {
        let partition_value = partition_value.into();
        if partition_value.is_empty() {
            return Err(ErrorKind::EmptyPartitionKey);
        }

        Ok(Self {
            partition_key: partition_key.into(),
            partition_value,
            sort: None,
        })
    }

    /// Attaches a sort key comparator, rejecting empty values.
    pub fn with_sort(
        mut self,
        attribute: impl Into<String>,
        condition: SortCondition,
    ) -> Result<Self, ErrorKind> {
        if condition.is_empty() {
            return Err(ErrorKind::MissingSortKey);
        }

        self.sort = Some(SortKeyCondition {
            attribute: attribute.into(),
            condition,
        });
        Ok(self)
    }

    /// The attribute map addressing a single item: partition value plus the
    /// sort anchor when a sort comparator is present.
    pub fn to_key(&self) -> Item {
        let mut key = Item::new();
        key.insert(
            self.partition_key.clone(),
            self.partition_value.to_attribute(),
        );
        if let Some(sort) = &self.sort {
            key.insert(sort.attribute.clone(), sort.condition.anchor().to_attribute());
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::types::AttributeValue;

    use super::*;

    #[test]
    fn test_key_condition_rejects_empty_partition() {
        assert_eq!(
            KeyCondition::new("pk", ""),
            Err(ErrorKind::EmptyPartitionKey)
        );
    }

    #[test]
    fn test_key_condition_accepts_non_empty_values() {
        for value in ["a", "room#1", " "] {
            let key = KeyCondition::new("pk", value).unwrap();
            assert_eq!(key.partition_value, KeyValue::from(value));
        }
        assert!(KeyCondition::new("pk", 0).is_ok());
    }

    #[test]
    fn test_with_sort_rejects_empty_value() {
        let key = KeyCondition::new("pk", "room").unwrap();
        assert_eq!(
            key.clone().with_sort("sk", SortCondition::equal("")),
            Err(ErrorKind::MissingSortKey)
        );
        assert_eq!(
            key.with_sort("sk", SortCondition::between("a", "")),
            Err(ErrorKind::MissingSortKey)
        );
    }

    #[test]
    fn test_to_key_uses_sort_anchor() {
        let key = KeyCondition::new("pk", "room")
            .unwrap()
            .with_sort("sk", SortCondition::between(10, 20))
            .unwrap()
            .to_key();

        assert_eq!(key.get("pk"), Some(&AttributeValue::S("room".into())));
        assert_eq!(key.get("sk"), Some(&AttributeValue::N("10".into())));
    }

    #[test]
    fn test_to_key_without_sort() {
        let key = KeyCondition::new("pk", "room").unwrap().to_key();
        assert_eq!(key.len(), 1);
    }
}
