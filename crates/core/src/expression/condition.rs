use crate::error::ErrorKind;
use crate::value::Value;

/// A comparator leaf, not yet bound to an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Equal(Value),
    NotEqual(Value),
    BeginsWith(String),
    Between(Value, Value),
    LessThan(Value),
    LessThanOrEqual(Value),
    GreaterThan(Value),
    GreaterThanOrEqual(Value),
    Contains(Value),
    NotContains(Value),
    In(Vec<Value>),
    Exists,
    NotExists,
}

pub fn equal(value: impl Into<Value>) -> Predicate {
    Predicate::Equal(value.into())
}

pub fn not_equal(value: impl Into<Value>) -> Predicate {
    Predicate::NotEqual(value.into())
}

pub fn begins_with(prefix: impl Into<String>) -> Predicate {
    Predicate::BeginsWith(prefix.into())
}

pub fn between(low: impl Into<Value>, high: impl Into<Value>) -> Predicate {
    Predicate::Between(low.into(), high.into())
}

pub fn less_than(value: impl Into<Value>) -> Predicate {
    Predicate::LessThan(value.into())
}

pub fn less_or_equal(value: impl Into<Value>) -> Predicate {
    Predicate::LessThanOrEqual(value.into())
}

pub fn greater_than(value: impl Into<Value>) -> Predicate {
    Predicate::GreaterThan(value.into())
}

pub fn greater_or_equal(value: impl Into<Value>) -> Predicate {
    Predicate::GreaterThanOrEqual(value.into())
}

pub fn contains(value: impl Into<Value>) -> Predicate {
    Predicate::Contains(value.into())
}

pub fn not_contains(value: impl Into<Value>) -> Predicate {
    Predicate::NotContains(value.into())
}

pub fn is_in<I, V>(values: I) -> Predicate
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Predicate::In(values.into_iter().map(Into::into).collect())
}

/// Membership test against a comma separated list of strings.
///
/// Blank segments are skipped, so `"a, b,,c"` yields `a`, `b` and `c`.
pub fn in_list(csv: &str) -> Predicate {
    is_in(
        csv.split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty()),
    )
}

pub fn exists() -> Predicate {
    Predicate::Exists
}

pub fn not_exists() -> Predicate {
    Predicate::NotExists
}

/// A filter or condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Leaf {
        attribute: String,
        predicate: Predicate,
    },
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
}

impl Condition {
    pub fn leaf(attribute: impl Into<String>, predicate: Predicate) -> Self {
        Condition::Leaf {
            attribute: attribute.into(),
            predicate,
        }
    }

    pub fn and(self, other: Condition) -> Self {
        Condition::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Condition) -> Self {
        Condition::Or(Box::new(self), Box::new(other))
    }

    /// Rejects leaves that can't be rendered, such as an `IN` with no values.
    pub fn validate(&self) -> Result<(), ErrorKind> {
        match self {
            Condition::Leaf {
                predicate: Predicate::In(values),
                ..
            } if values.is_empty() => Err(ErrorKind::EmptyInList),
            Condition::Leaf { .. } => Ok(()),
            Condition::And(left, right) | Condition::Or(left, right) => {
                left.validate()?;
                right.validate()
            }
        }
    }
}

/// Accumulates a filter one predicate at a time.
///
/// The first predicate must go through [`FilterBuilder::set`]; `and`/`or`
/// extend the existing root and fail while there is none. Every incoming
/// condition is validated before it is attached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterBuilder {
    root: Option<Condition>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the root predicate.
    pub fn set(&mut self, condition: Condition) -> Result<(), ErrorKind> {
        condition.validate()?;
        self.root = Some(condition);
        Ok(())
    }

    pub fn and(&mut self, condition: Condition) -> Result<(), ErrorKind> {
        condition.validate()?;
        let root = self.root.take().ok_or(ErrorKind::InvalidFilterCondition)?;
        self.root = Some(root.and(condition));
        Ok(())
    }

    pub fn or(&mut self, condition: Condition) -> Result<(), ErrorKind> {
        condition.validate()?;
        let root = self.root.take().ok_or(ErrorKind::InvalidFilterCondition)?;
        self.root = Some(root.or(condition));
        Ok(())
    }

    pub fn root(&self) -> Option<&Condition> {
        self.root.as_ref()
    }

    pub fn into_condition(self) -> Option<Condition> {
        self.root
    }
}
