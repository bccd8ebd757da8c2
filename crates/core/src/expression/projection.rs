use crate::error::ErrorKind;
use crate::value::Item;

/// Attributes to return. Empty means every attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection(Vec<String>);

impl Projection {
    pub fn all() -> Self {
        Self::default()
    }

    /// Builds a projection from a non-empty list of non-empty names.
    ///
    /// Repeated names are kept once, in first-seen order.
    pub fn new<I, S>(attributes: I) -> Result<Self, ErrorKind>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        for attribute in attributes {
            let attribute = attribute.into();
            if attribute.trim().is_empty() {
                return Err(ErrorKind::EmptyProjection);
            }
            if !names.contains(&attribute) {
                names.push(attribute);
            }
        }

        if names.is_empty() {
            return Err(ErrorKind::EmptyProjection);
        }
        Ok(Self(names))
    }

    pub fn is_all(&self) -> bool {
        self.0.is_empty()
    }

    pub fn attributes(&self) -> &[String] {
        &self.0
    }

    /// Keeps only the projected attributes of an item.
    pub fn apply(&self, item: &Item) -> Item {
        if self.is_all() {
            return item.clone();
        }
        item.iter()
            .filter(|(name, _)| self.0.contains(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::types::AttributeValue;

    use super::*;

    #[test]
    fn test_projection_rejects_empty_list() {
        let empty: Vec<String> = vec![];
        assert_eq!(Projection::new(empty), Err(ErrorKind::EmptyProjection));
    }

    #[test]
    fn test_projection_rejects_blank_names() {
        assert_eq!(
            Projection::new(["name", " "]),
            Err(ErrorKind::EmptyProjection)
        );
    }

    #[test]
    fn test_projection_keeps_order_and_dedupes() {
        let projection = Projection::new(["b", "a", "b"]).unwrap();
        assert_eq!(projection.attributes(), &["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_apply_filters_attributes() {
        let mut item = Item::new();
        item.insert("a".into(), AttributeValue::S("1".into()));
        item.insert("b".into(), AttributeValue::S("2".into()));

        let projected = Projection::new(["a"]).unwrap().apply(&item);
        assert_eq!(projected.len(), 1);
        assert!(projected.contains_key("a"));

        assert_eq!(Projection::all().apply(&item), item);
    }
}
