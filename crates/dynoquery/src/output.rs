//! Results of reads, and the unmarshal pipeline that turns them into
//! authorized domain records.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use tracing::debug;

use dynoquery_core::discriminator::Discriminator;
use dynoquery_core::pagination::Cursor;
use dynoquery_core::{Error, ErrorKind, Item, KeyValue, Operation, Result};

use crate::hooks::Records;

/// Items returned by a query, scan or batch get, plus the cursor to resume
/// from when a limit cut the result short.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Output {
    items: Vec<Item>,
    cursor: Option<Cursor>,
    discriminator: Option<String>,
    separator: Option<String>,
}

impl Output {
    pub fn new(items: Vec<Item>, cursor: Option<Cursor>) -> Self {
        Self {
            items,
            cursor,
            discriminator: None,
            separator: None,
        }
    }

    /// Sets the attribute [`Self::unmarshal`] uses to select records by type.
    pub fn with_discriminator(
        mut self,
        attribute: Option<String>,
        separator: Option<String>,
    ) -> Self {
        self.discriminator = attribute;
        self.separator = separator;
        self
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// The resumption cursor as plain key values.
    pub fn last_evaluated_key(&self) -> Result<Option<BTreeMap<String, KeyValue>>> {
        self.cursor
            .as_ref()
            .map(|cursor| {
                cursor
                    .key_values()
                    .map_err(|kind| Error::new(Operation::Unmarshal, kind))
            })
            .transpose()
    }

    /// Deserializes every item as `T`, without type selection or hooks.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        serde_dynamo::aws_sdk_dynamodb_1::from_items(self.items.clone())
            .map_err(|e| Error::new(Operation::Unmarshal, ErrorKind::Serialization(e.to_string())))
    }

    /// Selects the items whose type is in `entity_types`, deserializes them
    /// into `R` and runs its authorization hook once.
    pub async fn unmarshal<R: Records>(&self, entity_types: &[&str]) -> Result<R> {
        self.unmarshal_with(UnmarshalOptions::new(entity_types.iter().copied()))
            .await
    }

    pub async fn unmarshal_with<R: Records>(&self, options: UnmarshalOptions) -> Result<R> {
        let attribute = options
            .attribute
            .or_else(|| self.discriminator.clone())
            .ok_or_else(|| Error::new(Operation::Unmarshal, ErrorKind::MissingDiscriminator))?;
        let separator = options.separator.or_else(|| self.separator.clone());

        let discriminator =
            Discriminator::new(attribute, options.entity_types).with_separator(separator);
        let selected = discriminator.select(self.items.clone());
        debug!(
            attribute = discriminator.attribute(),
            fetched = self.items.len(),
            selected = selected.len(),
            "unmarshal"
        );

        let records: Vec<R::Record> = serde_dynamo::aws_sdk_dynamodb_1::from_items(selected)
            .map_err(|e| {
                Error::new(Operation::Unmarshal, ErrorKind::Serialization(e.to_string()))
            })?;
        let mut container = R::from_records(records);

        if !options.bypass_authorization {
            container.authorize().await.map_err(|e| {
                Error::new(
                    Operation::Authorization,
                    ErrorKind::Authorization(e.to_string()),
                )
            })?;
        }
        Ok(container)
    }
}

/// Options for [`Output::unmarshal_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnmarshalOptions {
    entity_types: Vec<String>,
    attribute: Option<String>,
    separator: Option<String>,
    bypass_authorization: bool,
}

impl UnmarshalOptions {
    pub fn new<I, S>(entity_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entity_types: entity_types.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Overrides the discriminator attribute.
    pub fn attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// Skips the authorization hook.
    pub fn bypass_authorization(mut self) -> Self {
        self.bypass_authorization = true;
        self
    }
}
