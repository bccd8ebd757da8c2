//! Rendering of the expression model into DynamoDB expression strings.
//!
//! Attribute names are always aliased (`#n0`, `#n1`, ...) so reserved words
//! never need special handling, and every operand becomes a value
//! placeholder (`:v0`, `:v1`, ...). One builder is used per request so the
//! key condition, filter and projection share a single placeholder space.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;

use super::condition::{Condition, Predicate};
use super::key::{KeyCondition, SortCondition};
use super::projection::Projection;

/// Placeholder maps produced by an [`ExpressionBuilder`].
///
/// DynamoDB rejects empty maps, so each one is `None` when unused.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placeholders {
    pub names: Option<HashMap<String, String>>,
    pub values: Option<HashMap<String, AttributeValue>>,
}

#[derive(Debug, Default)]
pub struct ExpressionBuilder {
    names: HashMap<String, String>,
    aliases: HashMap<String, String>,
    values: HashMap<String, AttributeValue>,
}

impl ExpressionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn name(&mut self, attribute: &str) -> String {
        if let Some(alias) = self.aliases.get(attribute) {
            return alias.clone();
        }
        let alias = format!("#n{}", self.aliases.len());
        self.aliases.insert(attribute.to_string(), alias.clone());
        self.names.insert(alias.clone(), attribute.to_string());
        alias
    }

    fn value(&mut self, value: AttributeValue) -> String {
        let placeholder = format!(":v{}", self.values.len());
        self.values.insert(placeholder.clone(), value);
        placeholder
    }

    pub fn key_condition(&mut self, key: &KeyCondition) -> String {
        let name = self.name(&key.partition_key);
        let value = self.value(key.partition_value.to_attribute());
        let mut expression = format!("{name} = {value}");

        if let Some(sort) = &key.sort {
            let name = self.name(&sort.attribute);
            let rendered = match &sort.condition {
                SortCondition::Equal(v) => format!("{name} = {}", self.value(v.to_attribute())),
                SortCondition::BeginsWith(prefix) => format!(
                    "begins_with({name}, {})",
                    self.value(AttributeValue::S(prefix.clone()))
                ),
                SortCondition::Between(low, high) => {
                    let low = self.value(low.to_attribute());
                    let high = self.value(high.to_attribute());
                    format!("{name} BETWEEN {low} AND {high}")
                }
                SortCondition::LessThan(v) => format!("{name} < {}", self.value(v.to_attribute())),
                SortCondition::LessThanOrEqual(v) => {
                    format!("{name} <= {}", self.value(v.to_attribute()))
                }
                SortCondition::GreaterThan(v) => {
                    format!("{name} > {}", self.value(v.to_attribute()))
                }
                SortCondition::GreaterThanOrEqual(v) => {
                    format!("{name} >= {}", self.value(v.to_attribute()))
                }
            };
            expression.push_str(" AND ");
            expression.push_str(&rendered);
        }

        expression
    }

    pub fn condition(&mut self, condition: &Condition) -> String {
        match condition {
            Condition::Leaf {
                attribute,
                predicate,
            } => self.predicate(attribute, predicate),
            Condition::And(left, right) => {
                format!("({}) AND ({})", self.condition(left), self.condition(right))
            }
            Condition::Or(left, right) => {
                format!("({}) OR ({})", self.condition(left), self.condition(right))
            }
        }
    }

    fn predicate(&mut self, attribute: &str, predicate: &Predicate) -> String {
        let name = self.name(attribute);
        match predicate {
            Predicate::Equal(v) => format!("{name} = {}", self.value(v.as_attribute().clone())),
            Predicate::NotEqual(v) => {
                format!("{name} <> {}", self.value(v.as_attribute().clone()))
            }
            Predicate::BeginsWith(prefix) => format!(
                "begins_with({name}, {})",
                self.value(AttributeValue::S(prefix.clone()))
            ),
            Predicate::Between(low, high) => {
                let low = self.value(low.as_attribute().clone());
                let high = self.value(high.as_attribute().clone());
                format!("{name} BETWEEN {low} AND {high}")
            }
            Predicate::LessThan(v) => format!("{name} < {}", self.value(v.as_attribute().clone())),
            Predicate::LessThanOrEqual(v) => {
                format!("{name} <= {}", self.value(v.as_attribute().clone()))
            }
            Predicate::GreaterThan(v) => {
                format!("{name} > {}", self.value(v.as_attribute().clone()))
            }
            Predicate::GreaterThanOrEqual(v) => {
                format!("{name} >= {}", self.value(v.as_attribute().clone()))
            }
            Predicate::Contains(v) => format!(
                "contains({name}, {})",
                self.value(v.as_attribute().clone())
            ),
            Predicate::NotContains(v) => format!(
                "NOT contains({name}, {})",
                self.value(v.as_attribute().clone())
            ),
            Predicate::In(values) => {
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|v| self.value(v.as_attribute().clone()))
                    .collect();
                format!("{name} IN ({})", placeholders.join(", "))
            }
            Predicate::Exists => format!("attribute_exists({name})"),
            Predicate::NotExists => format!("attribute_not_exists({name})"),
        }
    }

    /// Returns `None` when every attribute is projected.
    pub fn projection(&mut self, projection: &Projection) -> Option<String> {
        if projection.is_all() {
            return None;
        }
        let names: Vec<String> = projection
            .attributes()
            .iter()
            .map(|attribute| self.name(attribute))
            .collect();
        Some(names.join(", "))
    }

    /// Renders a `SET` update expression.
    pub fn update(&mut self, assignments: &[(String, AttributeValue)]) -> String {
        let parts: Vec<String> = assignments
            .iter()
            .map(|(attribute, value)| {
                let name = self.name(attribute);
                let value = self.value(value.clone());
                format!("{name} = {value}")
            })
            .collect();
        format!("SET {}", parts.join(", "))
    }

    pub fn finish(self) -> Placeholders {
        Placeholders {
            names: (!self.names.is_empty()).then_some(self.names),
            values: (!self.values.is_empty()).then_some(self.values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::condition::{begins_with, equal, in_list, not_contains, not_exists};
    use super::*;

    fn s(value: &str) -> AttributeValue {
        AttributeValue::S(value.to_string())
    }

    #[test]
    fn test_key_condition_with_begins_with() {
        let key = KeyCondition::new("pk", "room")
            .unwrap()
            .with_sort("sk", SortCondition::begins_with("2024"))
            .unwrap();

        let mut builder = ExpressionBuilder::new();
        let expression = builder.key_condition(&key);
        let placeholders = builder.finish();

        assert_eq!(expression, "#n0 = :v0 AND begins_with(#n1, :v1)");
        let names = placeholders.names.unwrap();
        assert_eq!(names["#n0"], "pk");
        assert_eq!(names["#n1"], "sk");
        let values = placeholders.values.unwrap();
        assert_eq!(values[":v0"], s("room"));
        assert_eq!(values[":v1"], s("2024"));
    }

    #[test]
    fn test_key_condition_between() {
        let key = KeyCondition::new("pk", 1)
            .unwrap()
            .with_sort("sk", SortCondition::between(3, 9))
            .unwrap();
        let expression = ExpressionBuilder::new().key_condition(&key);
        assert_eq!(expression, "#n0 = :v0 AND #n1 BETWEEN :v1 AND :v2");
    }

    #[test]
    fn test_nested_condition_rendering() {
        let condition = Condition::leaf("type", equal("room"))
            .and(Condition::leaf("name", begins_with("A")))
            .or(Condition::leaf("tags", not_contains("hidden")));

        let expression = ExpressionBuilder::new().condition(&condition);
        assert_eq!(
            expression,
            "((#n0 = :v0) AND (begins_with(#n1, :v1))) OR (NOT contains(#n2, :v2))"
        );
    }

    #[test]
    fn test_repeated_attribute_reuses_alias() {
        let condition = Condition::leaf("a", equal("x")).or(Condition::leaf("a", equal("y")));

        let mut builder = ExpressionBuilder::new();
        let expression = builder.condition(&condition);
        let placeholders = builder.finish();

        assert_eq!(expression, "(#n0 = :v0) OR (#n0 = :v1)");
        assert_eq!(placeholders.names.unwrap().len(), 1);
        assert_eq!(placeholders.values.unwrap().len(), 2);
    }

    #[test]
    fn test_in_and_existence_rendering() {
        let condition =
            Condition::leaf("status", in_list("open,closed")).and(Condition::leaf("pk", not_exists()));
        let expression = ExpressionBuilder::new().condition(&condition);
        assert_eq!(
            expression,
            "(#n0 IN (:v0, :v1)) AND (attribute_not_exists(#n1))"
        );
    }

    #[test]
    fn test_single_value_in_rendering() {
        let mut builder = ExpressionBuilder::new();
        let expression = builder.condition(&Condition::leaf("status", in_list("open")));
        let placeholders = builder.finish();

        assert_eq!(expression, "#n0 IN (:v0)");
        assert_eq!(placeholders.values.unwrap()[":v0"], s("open"));
    }

    #[test]
    fn test_empty_in_never_reaches_rendering() {
        // Empty lists are rejected when the filter is attached.
        let condition = Condition::leaf("status", in_list(""));
        assert_eq!(condition.validate(), Err(crate::error::ErrorKind::EmptyInList));
    }

    #[test]
    fn test_projection_and_update() {
        let mut builder = ExpressionBuilder::new();
        assert_eq!(builder.projection(&Projection::all()), None);
        assert_eq!(
            builder.projection(&Projection::new(["name", "size"]).unwrap()),
            Some("#n0, #n1".to_string())
        );
        assert_eq!(
            builder.update(&[("size".to_string(), AttributeValue::N("3".into()))]),
            "SET #n1 = :v0"
        );
    }

    #[test]
    fn test_finish_omits_empty_maps() {
        let mut builder = ExpressionBuilder::new();
        builder.projection(&Projection::new(["a"]).unwrap());
        let placeholders = builder.finish();
        assert!(placeholders.names.is_some());
        assert!(placeholders.values.is_none());
    }
}
