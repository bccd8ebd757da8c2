use crate::error::ErrorKind;
use crate::value::Item;

/// A registered secondary index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryIndex {
    pub name: String,
    pub partition_key: String,
    pub sort_key: Option<String>,
}

impl SecondaryIndex {
    pub fn new(name: impl Into<String>, partition_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partition_key: partition_key.into(),
            sort_key: None,
        }
    }

    pub fn with_sort_key(mut self, sort_key: impl Into<String>) -> Self {
        self.sort_key = Some(sort_key.into());
        self
    }
}

/// Key layout of the table a client is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table_name: String,
    pub partition_key: String,
    pub sort_key: Option<String>,
    pub key_separator: Option<String>,
    indexes: Vec<SecondaryIndex>,
}

impl TableSchema {
    pub fn new(
        table_name: impl Into<String>,
        partition_key: impl Into<String>,
    ) -> Result<Self, ErrorKind> {
        let table_name = table_name.into();
        let partition_key = partition_key.into();
        if table_name.trim().is_empty() {
            return Err(ErrorKind::EmptyTableName);
        }
        if partition_key.trim().is_empty() {
            return Err(ErrorKind::MissingPartitionKey);
        }

        Ok(Self {
            table_name,
            partition_key,
            sort_key: None,
            key_separator: None,
            indexes: Vec::new(),
        })
    }

    pub fn with_sort_key(mut self, sort_key: impl Into<String>) -> Self {
        let sort_key = sort_key.into();
        self.sort_key = (!sort_key.is_empty()).then_some(sort_key);
        self
    }

    pub fn with_key_separator(mut self, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        self.key_separator = (!separator.is_empty()).then_some(separator);
        self
    }

    /// Registers a secondary index. Index names must be unique.
    pub fn with_index(mut self, index: SecondaryIndex) -> Result<Self, ErrorKind> {
        if self.indexes.iter().any(|existing| existing.name == index.name) {
            return Err(ErrorKind::DuplicateIndex(index.name));
        }
        self.indexes.push(index);
        Ok(self)
    }

    /// The same layout bound to another table.
    pub fn for_table(&self, table_name: impl Into<String>) -> Result<Self, ErrorKind> {
        let table_name = table_name.into();
        if table_name.trim().is_empty() {
            return Err(ErrorKind::EmptyTableName);
        }
        Ok(Self {
            table_name,
            ..self.clone()
        })
    }

    pub fn indexes(&self) -> &[SecondaryIndex] {
        &self.indexes
    }

    /// Looks up a registered index by name.
    pub fn index(&self, name: &str) -> Result<&SecondaryIndex, ErrorKind> {
        self.indexes
            .iter()
            .find(|index| index.name == name)
            .ok_or_else(|| ErrorKind::UnknownIndex(name.to_string()))
    }

    /// Default discriminator attribute: the first index's partition key.
    pub fn default_discriminator(&self) -> Option<&str> {
        self.indexes
            .first()
            .map(|index| index.partition_key.as_str())
    }

    /// Names of the primary key attributes.
    pub fn key_attributes(&self) -> Vec<String> {
        let mut names = vec![self.partition_key.clone()];
        names.extend(self.sort_key.clone());
        names
    }

    /// Extracts the primary key of an item. Missing attributes are skipped.
    pub fn key_of(&self, item: &Item) -> Item {
        self.key_attributes()
            .into_iter()
            .filter_map(|name| item.get(&name).cloned().map(|value| (name, value)))
            .collect()
    }

    /// Whether the item carries every primary key attribute.
    pub fn has_full_key(&self, item: &Item) -> bool {
        self.key_attributes()
            .iter()
            .all(|name| item.contains_key(name))
    }
}
