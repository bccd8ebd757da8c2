use aws_sdk_dynamodb::types::AttributeValue;

use crate::value::Item;

/// Selects records whose type attribute is in an allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discriminator {
    attribute: String,
    separator: Option<String>,
    allowed: Vec<String>,
}

impl Discriminator {
    pub fn new<I, S>(attribute: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attribute: attribute.into(),
            separator: None,
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// Compare only the segment before the first `separator`, so a value
    /// like `room#42` is classified as `room`.
    pub fn with_separator(mut self, separator: Option<String>) -> Self {
        self.separator = separator.filter(|s| !s.is_empty());
        self
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// The type name of an item, if it has a string discriminator.
    pub fn type_of<'a>(&self, item: &'a Item) -> Option<&'a str> {
        let AttributeValue::S(value) = item.get(&self.attribute)? else {
            return None;
        };
        match &self.separator {
            Some(separator) => value.split(separator.as_str()).next(),
            None => Some(value.as_str()),
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        self.type_of(item)
            .is_some_and(|kind| self.allowed.iter().any(|allowed| allowed == kind))
    }

    /// Keeps matching items, preserving order.
    pub fn select(&self, items: Vec<Item>) -> Vec<Item> {
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(attribute: &str, value: &str) -> Item {
        let mut item = Item::new();
        item.insert(attribute.into(), AttributeValue::S(value.into()));
        item
    }

    #[test]
    fn test_select_by_allow_list() {
        let discriminator = Discriminator::new("_type", ["room", "hall"]);
        let items = vec![
            item("_type", "room"),
            item("_type", "vehicle"),
            item("_type", "hall"),
            item("other", "room"),
        ];
        assert_eq!(discriminator.select(items).len(), 2);
    }

    #[test]
    fn test_separator_uses_first_segment() {
        let discriminator =
            Discriminator::new("_type", ["vehicle"]).with_separator(Some("#".to_string()));
        assert!(discriminator.matches(&item("_type", "vehicle#1234")));
        assert!(!discriminator.matches(&item("_type", "room#vehicle")));
    }

    #[test]
    fn test_without_separator_value_must_match_whole() {
        let discriminator = Discriminator::new("_type", ["vehicle"]);
        assert!(!discriminator.matches(&item("_type", "vehicle#1234")));
    }

    #[test]
    fn test_non_string_discriminator_never_matches() {
        let mut record = Item::new();
        record.insert("_type".into(), AttributeValue::N("1".into()));
        let discriminator = Discriminator::new("_type", ["1"]);
        assert!(!discriminator.matches(&record));
        assert_eq!(discriminator.type_of(&record), None);
    }
}
