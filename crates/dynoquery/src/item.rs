//! The fluent builder for key-addressed operations, queries and scans.
//!
//! Every step threads a `Result`: the first failing step stores its error
//! and every later step passes it through untouched, so the terminal call
//! reports it before anything is sent to the store.

use serde::de::DeserializeOwned;

use dynoquery_core::expression::{
    Condition, FilterBuilder, KeyCondition, Predicate, Projection, SortCondition,
};
use dynoquery_core::pagination::{Counts, Cursor, Direction, PaginationState};
use dynoquery_core::schema::{SecondaryIndex, TableSchema};
use dynoquery_core::store::{DeleteItemRequest, GetItemRequest, ReadRequest, Select};
use dynoquery_core::{Error, ErrorKind, Item, KeyValue, Operation, Result};

use crate::client::Client;
use crate::hooks::Authorize;
use crate::output::Output;
use crate::paginate::{self, ReadKind};

#[derive(Debug, Clone)]
struct ItemState {
    index: Option<SecondaryIndex>,
    key: Option<KeyCondition>,
    filter: FilterBuilder,
    projection: Projection,
    pagination: PaginationState,
}

impl ItemState {
    fn new(index: Option<SecondaryIndex>, key: Option<KeyCondition>) -> Self {
        Self {
            index,
            key,
            filter: FilterBuilder::new(),
            projection: Projection::all(),
            pagination: PaginationState::default(),
        }
    }
}

/// Builder for one logical operation. Obtain it from [`Client::pk`],
/// [`Client::index`], [`Client::index_scan`] or [`Client::table_scan`].
#[derive(Debug, Clone)]
pub struct ItemBuilder {
    client: Client,
    state: Result<ItemState>,
}

impl ItemBuilder {
    pub(crate) fn partition(client: Client, value: KeyValue) -> Self {
        let state = KeyCondition::new(&client.schema().partition_key, value)
            .map(|key| ItemState::new(None, Some(key)))
            .map_err(|kind| Error::new(Operation::PartitionKey, kind));
        Self { client, state }
    }

    pub(crate) fn on_index(client: Client, name: &str, value: KeyValue) -> Self {
        let state = client
            .schema()
            .index(name)
            .cloned()
            .map_err(|kind| Error::new(Operation::Index, kind))
            .and_then(|index| {
                KeyCondition::new(&index.partition_key, value)
                    .map(|key| ItemState::new(Some(index), Some(key)))
                    .map_err(|kind| Error::new(Operation::PartitionKey, kind))
            });
        Self { client, state }
    }

    pub(crate) fn index_scan(client: Client, name: &str) -> Self {
        let state = client
            .schema()
            .index(name)
            .cloned()
            .map(|index| ItemState::new(Some(index), None))
            .map_err(|kind| Error::new(Operation::Index, kind));
        Self { client, state }
    }

    pub(crate) fn table_scan(client: Client) -> Self {
        Self {
            client,
            state: Ok(ItemState::new(None, None)),
        }
    }

    fn step(
        self,
        operation: Operation,
        apply: impl FnOnce(&mut ItemState, &TableSchema) -> std::result::Result<(), ErrorKind>,
    ) -> Self {
        let Self { client, state } = self;
        let state = state.and_then(|mut state| {
            apply(&mut state, client.schema()).map_err(|kind| Error::new(operation, kind))?;
            Ok(state)
        });
        Self { client, state }
    }

    /// The error recorded so far, if any.
    pub fn error(&self) -> Option<&Error> {
        self.state.as_ref().err()
    }

    /// Adds a sort key comparator.
    ///
    /// Fails when the table (or bound index) has no sort key, or when the
    /// comparator value is empty.
    pub fn sk(self, condition: SortCondition) -> Self {
        self.step(Operation::SortKey, |state, schema| {
            let attribute = match &state.index {
                Some(index) => index.sort_key.clone(),
                None => schema.sort_key.clone(),
            }
            .ok_or(ErrorKind::UnexpectedSortKey)?;
            let key = state.key.take().ok_or(ErrorKind::UnexpectedSortKey)?;
            state.key = Some(key.with_sort(attribute, condition)?);
            Ok(())
        })
    }

    /// Sets the root filter predicate, replacing any previous filter.
    pub fn filter(self, attribute: impl Into<String>, predicate: Predicate) -> Self {
        let condition = Condition::leaf(attribute, predicate);
        self.step(Operation::Filter, |state, _| state.filter.set(condition))
    }

    /// ANDs a predicate onto the filter. Requires a prior [`Self::filter`].
    pub fn and_filter(self, attribute: impl Into<String>, predicate: Predicate) -> Self {
        let condition = Condition::leaf(attribute, predicate);
        self.step(Operation::AndFilter, |state, _| state.filter.and(condition))
    }

    /// ORs a predicate onto the filter. Requires a prior [`Self::filter`].
    pub fn or_filter(self, attribute: impl Into<String>, predicate: Predicate) -> Self {
        let condition = Condition::leaf(attribute, predicate);
        self.step(Operation::OrFilter, |state, _| state.filter.or(condition))
    }

    /// Restricts the returned attributes.
    pub fn project<I, S>(self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let projection = Projection::new(attributes);
        self.step(Operation::Projection, |state, _| {
            state.projection = projection?;
            Ok(())
        })
    }

    /// Caps the number of returned items; 0 means no cap.
    pub fn limit(self, limit: usize) -> Self {
        self.step(Operation::Query, |state, _| {
            state.pagination.limit = limit;
            Ok(())
        })
    }

    /// Resumes after a cursor returned by a previous limited call.
    pub fn resume(self, cursor: Cursor) -> Self {
        self.step(Operation::Query, |state, _| {
            state.pagination.cursor = (!cursor.is_empty()).then_some(cursor);
            Ok(())
        })
    }

    /// Resumes after a last evaluated key held as plain key values.
    pub fn start_key<I, K>(self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, KeyValue)>,
        K: Into<String>,
    {
        self.resume(Cursor::from_key_values(values))
    }

    /// Reads the sort key in ascending (`true`) or descending order.
    pub fn scan_forward(self, forward: bool) -> Self {
        self.step(Operation::Query, |state, _| {
            state.pagination.direction = if forward {
                Direction::Forward
            } else {
                Direction::Reverse
            };
            Ok(())
        })
    }

    fn into_state(self, operation: Operation) -> Result<(Client, ItemState)> {
        let state = self.state?;
        if state.key.is_none() && matches!(operation, Operation::Query) {
            return Err(Error::new(operation, ErrorKind::EmptyPartitionKey));
        }
        Ok((self.client, state))
    }

    /// The full primary key this builder addresses.
    pub(crate) fn into_item_key(self, operation: Operation) -> Result<(Client, Item)> {
        let state = self.state?;
        if state.index.is_some() {
            return Err(Error::new(operation, ErrorKind::IndexNotSupported));
        }
        let key = state
            .key
            .ok_or_else(|| Error::new(operation, ErrorKind::EmptyPartitionKey))?;
        if self.client.schema().sort_key.is_some() && key.sort.is_none() {
            return Err(Error::new(operation, ErrorKind::MissingSortKey));
        }
        Ok((self.client, key.to_key()))
    }

    /// Fetches the addressed item. `Ok(None)` when it does not exist.
    pub async fn get<T: DeserializeOwned>(self) -> Result<Option<T>> {
        let projection = match &self.state {
            Ok(state) => state.projection.clone(),
            Err(_) => Projection::all(),
        };
        let (client, key) = self.into_item_key(Operation::Get)?;
        let item = client
            .store()
            .get_item(GetItemRequest {
                table_name: client.schema().table_name.clone(),
                key,
                projection,
            })
            .await
            .map_err(|e| Error::from_store(Operation::Get, e))?;

        item.map(|item| {
            serde_dynamo::from_item(item)
                .map_err(|e| Error::new(Operation::Get, ErrorKind::Serialization(e.to_string())))
        })
        .transpose()
    }

    /// Fetches the addressed item and runs its authorization hook.
    pub async fn get_authorized<T: DeserializeOwned + Authorize>(self) -> Result<Option<T>> {
        let Some(mut record) = self.get::<T>().await? else {
            return Ok(None);
        };
        record.authorize().await.map_err(|e| {
            Error::new(
                Operation::Authorization,
                ErrorKind::Authorization(e.to_string()),
            )
        })?;
        Ok(Some(record))
    }

    /// Deletes the addressed item, failing with "key doesn't exist" if absent.
    pub async fn delete(self) -> Result<()> {
        let (client, key) = self.into_item_key(Operation::Delete)?;
        let guard = key
            .keys()
            .map(|name| Condition::leaf(name.clone(), dynoquery_core::expression::exists()))
            .reduce(Condition::and);

        client
            .store()
            .delete_item(DeleteItemRequest {
                table_name: client.schema().table_name.clone(),
                key,
                condition: guard,
            })
            .await
            .map_err(|e| Error::from_store(Operation::Delete, e))
    }

    /// Runs a key-condition query, following pages until the limit or the
    /// end of the partition.
    pub async fn query(self) -> Result<Output> {
        self.read(Operation::Query, ReadKind::Query).await
    }

    /// Runs a scan of the table (or bound index). Key conditions are not
    /// applied; use filters instead.
    pub async fn scan(self) -> Result<Output> {
        self.read(Operation::Scan, ReadKind::Scan).await
    }

    async fn read(self, operation: Operation, kind: ReadKind) -> Result<Output> {
        let (client, state) = self.into_state(operation)?;
        let request = read_request(&client, &state, kind);
        let key_attributes = cursor_attributes(client.schema(), state.index.as_ref());

        let result = paginate::fetch_items(
            client.store().as_ref(),
            operation,
            kind,
            request,
            &state.pagination,
            key_attributes,
        )
        .await?;

        Ok(Output::new(result.items, result.cursor).with_discriminator(
            discriminator_attribute(client.schema(), state.index.as_ref()),
            client.schema().key_separator.clone(),
        ))
    }

    /// Counts scanned and matching items across every page. Queries when a
    /// partition key is set, scans otherwise.
    pub async fn count(self) -> Result<Counts> {
        self.count_inner(Operation::Count, None).await
    }

    /// Like [`Self::count`], but stops once `limit` items have matched.
    pub async fn count_with_limit(self, limit: usize) -> Result<Counts> {
        self.count_inner(Operation::CountWithLimit, Some(limit)).await
    }

    async fn count_inner(self, operation: Operation, limit: Option<usize>) -> Result<Counts> {
        let (client, state) = self.into_state(operation)?;
        let kind = if state.key.is_some() {
            ReadKind::Query
        } else {
            ReadKind::Scan
        };
        let mut request = read_request(&client, &state, kind);
        request.select = Select::Count;
        request.projection = Projection::all();

        paginate::count_items(
            client.store().as_ref(),
            operation,
            kind,
            request,
            limit,
            state.pagination.cursor.clone(),
        )
        .await
    }
}

fn read_request(client: &Client, state: &ItemState, kind: ReadKind) -> ReadRequest {
    let mut request = ReadRequest::new(&client.schema().table_name);
    request.index_name = state.index.as_ref().map(|index| index.name.clone());
    if matches!(kind, ReadKind::Query) {
        request.key_condition = state.key.clone();
    }
    request.filter = state.filter.root().cloned();
    request.projection = state.projection.clone();
    request.direction = state.pagination.direction;
    request
}

/// Attributes a resumption cursor must carry: the table key, plus the
/// index key when reading an index.
fn cursor_attributes(schema: &TableSchema, index: Option<&SecondaryIndex>) -> Vec<String> {
    let mut names = schema.key_attributes();
    if let Some(index) = index {
        for name in std::iter::once(&index.partition_key).chain(index.sort_key.as_ref()) {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
    }
    names
}

fn discriminator_attribute(schema: &TableSchema, index: Option<&SecondaryIndex>) -> Option<String> {
    index
        .map(|index| index.partition_key.as_str())
        .or_else(|| schema.default_discriminator())
        .map(str::to_string)
}
