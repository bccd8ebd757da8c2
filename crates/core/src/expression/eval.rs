//! Evaluation of conditions against items, used by the in-memory store.

use std::cmp::Ordering;

use aws_sdk_dynamodb::types::AttributeValue;

use super::condition::{Condition, Predicate};
use super::key::{KeyCondition, SortCondition};
use crate::value::Item;

/// Orders two attributes of the same scalar kind.
///
/// Strings compare lexicographically, numbers numerically, binaries by
/// bytes. Mismatched kinds are incomparable.
pub fn compare(left: &AttributeValue, right: &AttributeValue) -> Option<Ordering> {
    match (left, right) {
        (AttributeValue::S(l), AttributeValue::S(r)) => Some(l.cmp(r)),
        (AttributeValue::N(l), AttributeValue::N(r)) => {
            let l: f64 = l.parse().ok()?;
            let r: f64 = r.parse().ok()?;
            l.partial_cmp(&r)
        }
        (AttributeValue::B(l), AttributeValue::B(r)) => Some(l.as_ref().cmp(r.as_ref())),
        (AttributeValue::Bool(l), AttributeValue::Bool(r)) if l == r => Some(Ordering::Equal),
        (AttributeValue::Null(_), AttributeValue::Null(_)) => Some(Ordering::Equal),
        _ => None,
    }
}

fn equals(left: &AttributeValue, right: &AttributeValue) -> bool {
    compare(left, right) == Some(Ordering::Equal) || left == right
}

fn within(value: &AttributeValue, low: &AttributeValue, high: &AttributeValue) -> bool {
    matches!(
        compare(value, low),
        Some(Ordering::Greater | Ordering::Equal)
    ) && matches!(compare(value, high), Some(Ordering::Less | Ordering::Equal))
}

fn has_prefix(value: &AttributeValue, prefix: &str) -> bool {
    matches!(value, AttributeValue::S(s) if s.starts_with(prefix))
}

fn contains(haystack: &AttributeValue, needle: &AttributeValue) -> bool {
    match (haystack, needle) {
        (AttributeValue::S(s), AttributeValue::S(n)) => s.contains(n.as_str()),
        (AttributeValue::Ss(set), AttributeValue::S(n)) => set.contains(n),
        (AttributeValue::Ns(set), AttributeValue::N(n)) => set
            .iter()
            .any(|member| equals(&AttributeValue::N(member.clone()), &AttributeValue::N(n.clone()))),
        (AttributeValue::L(list), needle) => list.iter().any(|member| equals(member, needle)),
        _ => false,
    }
}

impl Predicate {
    /// Tests a single attribute value (`None` when the attribute is absent).
    pub fn matches(&self, value: Option<&AttributeValue>) -> bool {
        match (self, value) {
            (Predicate::Exists, value) => value.is_some(),
            (Predicate::NotExists, value) => value.is_none(),
            (Predicate::NotEqual(expected), Some(v)) => !equals(v, expected.as_attribute()),
            (Predicate::NotEqual(_), None) => true,
            (Predicate::NotContains(needle), Some(v)) => !contains(v, needle.as_attribute()),
            (Predicate::NotContains(_), None) => true,
            (_, None) => false,
            (Predicate::Equal(expected), Some(v)) => equals(v, expected.as_attribute()),
            (Predicate::BeginsWith(prefix), Some(v)) => has_prefix(v, prefix),
            (Predicate::Between(low, high), Some(v)) => {
                within(v, low.as_attribute(), high.as_attribute())
            }
            (Predicate::LessThan(bound), Some(v)) => {
                compare(v, bound.as_attribute()) == Some(Ordering::Less)
            }
            (Predicate::LessThanOrEqual(bound), Some(v)) => matches!(
                compare(v, bound.as_attribute()),
                Some(Ordering::Less | Ordering::Equal)
            ),
            (Predicate::GreaterThan(bound), Some(v)) => {
                compare(v, bound.as_attribute()) == Some(Ordering::Greater)
            }
            (Predicate::GreaterThanOrEqual(bound), Some(v)) => matches!(
                compare(v, bound.as_attribute()),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            (Predicate::Contains(needle), Some(v)) => contains(v, needle.as_attribute()),
            (Predicate::In(candidates), Some(v)) => candidates
                .iter()
                .any(|candidate| equals(v, candidate.as_attribute())),
        }
    }
}

impl Condition {
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            Condition::Leaf {
                attribute,
                predicate,
            } => predicate.matches(item.get(attribute)),
            Condition::And(left, right) => left.matches(item) && right.matches(item),
            Condition::Or(left, right) => left.matches(item) || right.matches(item),
        }
    }
}

impl SortCondition {
    pub fn matches(&self, value: &AttributeValue) -> bool {
        match self {
            SortCondition::Equal(v) => equals(value, &v.to_attribute()),
            SortCondition::BeginsWith(prefix) => has_prefix(value, prefix),
            SortCondition::Between(low, high) => {
                within(value, &low.to_attribute(), &high.to_attribute())
            }
            SortCondition::LessThan(v) => compare(value, &v.to_attribute()) == Some(Ordering::Less),
            SortCondition::LessThanOrEqual(v) => matches!(
                compare(value, &v.to_attribute()),
                Some(Ordering::Less | Ordering::Equal)
            ),
            SortCondition::GreaterThan(v) => {
                compare(value, &v.to_attribute()) == Some(Ordering::Greater)
            }
            SortCondition::GreaterThanOrEqual(v) => matches!(
                compare(value, &v.to_attribute()),
                Some(Ordering::Greater | Ordering::Equal)
            ),
        }
    }
}

impl KeyCondition {
    pub fn matches(&self, item: &Item) -> bool {
        let partition_matches = item
            .get(&self.partition_key)
            .is_some_and(|value| equals(value, &self.partition_value.to_attribute()));

        partition_matches
            && self.sort.as_ref().is_none_or(|sort| {
                item.get(&sort.attribute)
                    .is_some_and(|value| sort.condition.matches(value))
            })
    }
}
