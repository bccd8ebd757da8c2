//! In-memory store implementation.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use tokio::sync::RwLock;

use dynoquery_core::batch::WriteRequest;
use dynoquery_core::expression::{compare, Condition};
use dynoquery_core::pagination::{Cursor, Direction};
use dynoquery_core::schema::TableSchema;
use dynoquery_core::store::{
    BatchGetOutput, BatchGetRequest, BatchWriteOutput, BatchWriteRequest, DeleteItemRequest,
    GetItemRequest, Page, PutItemRequest, ReadRequest, Select, Store, StoreError, StoreResult,
    UpdateItemRequest,
};
use dynoquery_core::Item;

#[derive(Debug, Clone)]
struct Table {
    schema: TableSchema,
    items: Vec<Item>,
}

impl Table {
    fn position(&self, key: &Item) -> Option<usize> {
        let attributes = self.schema.key_attributes();
        self.items
            .iter()
            .position(|item| order(item, key, &attributes) == Ordering::Equal)
    }

    fn check_key(&self, item: &Item) -> StoreResult<()> {
        if self.schema.has_full_key(item) {
            Ok(())
        } else {
            Err(StoreError::Validation(
                "item is missing a primary key attribute".to_string(),
            ))
        }
    }

    fn put(&mut self, item: Item) {
        match self.position(&item) {
            Some(index) => self.items[index] = item,
            None => self.items.push(item),
        }
    }

    /// Items visible through the requested index, in key order.
    fn read_view(&self, index_name: Option<&str>) -> StoreResult<(Vec<String>, Vec<&Item>)> {
        let mut attributes = Vec::new();
        if let Some(name) = index_name {
            let index = self
                .schema
                .index(name)
                .map_err(|_| StoreError::IndexNotFound)?;
            attributes.push(index.partition_key.clone());
            attributes.extend(index.sort_key.clone());
        }
        for name in self.schema.key_attributes() {
            if !attributes.contains(&name) {
                attributes.push(name);
            }
        }

        let mut view: Vec<&Item> = self
            .items
            .iter()
            .filter(|item| attributes.iter().all(|name| item.contains_key(name)))
            .collect();
        view.sort_by(|a, b| order(a, b, &attributes));
        Ok((attributes, view))
    }
}

fn order(left: &Item, right: &Item, attributes: &[String]) -> Ordering {
    for name in attributes {
        let ordering = match (left.get(name), right.get(name)) {
            (Some(l), Some(r)) => {
                compare(l, r).unwrap_or_else(|| type_rank(l).cmp(&type_rank(r)))
            }
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Orders values of different types: numbers, then strings, then binary.
fn type_rank(value: &AttributeValue) -> u8 {
    match value {
        AttributeValue::N(_) => 0,
        AttributeValue::S(_) => 1,
        AttributeValue::B(_) => 2,
        _ => 3,
    }
}

fn check_condition(condition: Option<&Condition>, existing: Option<&Item>) -> StoreResult<()> {
    let empty = Item::new();
    match condition {
        Some(condition) if !condition.matches(existing.unwrap_or(&empty)) => {
            Err(StoreError::ConditionalCheckFailed)
        }
        _ => Ok(()),
    }
}

/// In-memory [`Store`] for tests and local development.
///
/// Tables must be created with [`InMemoryStore::create_table`] before use.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<HashMap<String, Table>>>,
    page_size: Option<usize>,
    batch_capacity: Option<usize>,
    batch_calls: Arc<AtomicUsize>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(HashMap::new())),
            page_size: None,
            batch_capacity: None,
            batch_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Caps the items evaluated per query or scan page, like DynamoDB's 1 MB
    /// page limit.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size.max(1));
        self
    }

    /// Processes at most `capacity` entries per batch call and reports the
    /// rest as unprocessed. Zero leaves every entry unprocessed.
    pub fn with_batch_capacity(mut self, capacity: usize) -> Self {
        self.batch_capacity = Some(capacity);
        self
    }

    /// Number of batch-get and batch-write calls served so far.
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(AtomicOrdering::SeqCst)
    }

    /// Creates (or empties) the table described by `schema`.
    pub async fn create_table(&self, schema: &TableSchema) {
        let mut tables = self.tables.write().await;
        tables.insert(
            schema.table_name.clone(),
            Table {
                schema: schema.clone(),
                items: Vec::new(),
            },
        );
    }

    /// Snapshot of a table's items in primary key order.
    pub async fn items(&self, table_name: &str) -> Vec<Item> {
        let tables = self.tables.read().await;
        tables
            .get(table_name)
            .and_then(|table| table.read_view(None).ok())
            .map(|(_, view)| view.into_iter().cloned().collect())
            .unwrap_or_default()
    }

    fn read(&self, table: &Table, request: &ReadRequest, query: bool) -> StoreResult<Page> {
        let (attributes, view) = table.read_view(request.index_name.as_deref())?;

        let mut candidates: Vec<&Item> = if query {
            let key = request.key_condition.as_ref().ok_or_else(|| {
                StoreError::Validation("query requires a key condition".to_string())
            })?;
            view.into_iter().filter(|item| key.matches(item)).collect()
        } else {
            view
        };

        let direction = if query {
            request.direction
        } else {
            Direction::Forward
        };
        if !direction.is_forward() {
            candidates.reverse();
        }

        if let Some(start) = &request.exclusive_start_key {
            let past = if direction.is_forward() {
                Ordering::Greater
            } else {
                Ordering::Less
            };
            candidates.retain(|item| order(item, start.as_item(), &attributes) == past);
        }

        let page_limit = match (request.limit, self.page_size) {
            (Some(limit), Some(size)) => Some(limit.min(size)),
            (limit, size) => limit.or(size),
        };
        let evaluated = match page_limit {
            Some(limit) if limit < candidates.len() => &candidates[..limit],
            _ => &candidates[..],
        };
        let last_evaluated_key = (evaluated.len() < candidates.len())
            .then(|| evaluated.last())
            .flatten()
            .map(|last| Cursor::from_item(last, &attributes));

        let matched: Vec<&Item> = evaluated
            .iter()
            .copied()
            .filter(|item| {
                request
                    .filter
                    .as_ref()
                    .is_none_or(|filter| filter.matches(item))
            })
            .collect();

        let items = match request.select {
            Select::Items => matched
                .iter()
                .map(|item| request.projection.apply(item))
                .collect(),
            Select::Count => Vec::new(),
        };

        Ok(Page {
            items,
            count: matched.len(),
            scanned_count: evaluated.len(),
            last_evaluated_key,
        })
    }

    /// Splits `entries` into the processed prefix and the unprocessed rest,
    /// sharing `budget` across tables.
    fn take_budget<E>(
        budget: &mut Option<usize>,
        entries: Vec<E>,
    ) -> (Vec<E>, Vec<E>) {
        match budget {
            Some(remaining) => {
                let mut entries = entries;
                let take = (*remaining).min(entries.len());
                let rest = entries.split_off(take);
                *remaining -= take;
                (entries, rest)
            }
            None => (entries, Vec::new()),
        }
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get_item(&self, request: GetItemRequest) -> StoreResult<Option<Item>> {
        let tables = self.tables.read().await;
        let table = tables
            .get(&request.table_name)
            .ok_or(StoreError::ResourceNotFound)?;
        Ok(table
            .position(&request.key)
            .map(|index| request.projection.apply(&table.items[index])))
    }

    async fn put_item(&self, request: PutItemRequest) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&request.table_name)
            .ok_or(StoreError::ResourceNotFound)?;
        table.check_key(&request.item)?;

        let existing = table.position(&request.item).map(|i| &table.items[i]);
        check_condition(request.condition.as_ref(), existing)?;
        table.put(request.item);
        Ok(())
    }

    async fn update_item(&self, request: UpdateItemRequest) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&request.table_name)
            .ok_or(StoreError::ResourceNotFound)?;
        table.check_key(&request.key)?;

        let existing = table.position(&request.key).map(|i| &table.items[i]);
        check_condition(request.condition.as_ref(), existing)?;

        let mut item = existing.cloned().unwrap_or_else(|| request.key.clone());
        item.extend(request.assignments);
        table.put(item);
        Ok(())
    }

    async fn delete_item(&self, request: DeleteItemRequest) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&request.table_name)
            .ok_or(StoreError::ResourceNotFound)?;

        let position = table.position(&request.key);
        check_condition(
            request.condition.as_ref(),
            position.map(|i| &table.items[i]),
        )?;
        if let Some(index) = position {
            table.items.remove(index);
        }
        Ok(())
    }

    async fn query(&self, request: &ReadRequest) -> StoreResult<Page> {
        let tables = self.tables.read().await;
        let table = tables
            .get(&request.table_name)
            .ok_or(StoreError::ResourceNotFound)?;
        self.read(table, request, true)
    }

    async fn scan(&self, request: &ReadRequest) -> StoreResult<Page> {
        let tables = self.tables.read().await;
        let table = tables
            .get(&request.table_name)
            .ok_or(StoreError::ResourceNotFound)?;
        self.read(table, request, false)
    }

    async fn batch_get(&self, request: BatchGetRequest) -> StoreResult<BatchGetOutput> {
        self.batch_calls.fetch_add(1, AtomicOrdering::SeqCst);
        let tables = self.tables.read().await;
        let mut budget = self.batch_capacity;
        let mut output = BatchGetOutput::default();

        for (table_name, keys) in request.keys {
            let table = tables
                .get(&table_name)
                .ok_or(StoreError::ResourceNotFound)?;
            let (processed, rest) = Self::take_budget(&mut budget, keys);
            output.items.extend(processed.iter().filter_map(|key| {
                table
                    .position(key)
                    .map(|index| request.projection.apply(&table.items[index]))
            }));
            if !rest.is_empty() {
                output.unprocessed.insert(table_name, rest);
            }
        }
        Ok(output)
    }

    async fn batch_write(&self, request: BatchWriteRequest) -> StoreResult<BatchWriteOutput> {
        self.batch_calls.fetch_add(1, AtomicOrdering::SeqCst);
        let mut tables = self.tables.write().await;
        let mut budget = self.batch_capacity;
        let mut unprocessed = BTreeMap::new();

        for (table_name, requests) in request.requests {
            let table = tables
                .get_mut(&table_name)
                .ok_or(StoreError::ResourceNotFound)?;
            let (processed, rest) = Self::take_budget(&mut budget, requests);
            for write in processed {
                match write {
                    WriteRequest::Put(item) => {
                        table.check_key(&item)?;
                        table.put(item);
                    }
                    WriteRequest::Delete(key) => {
                        if let Some(index) = table.position(&key) {
                            table.items.remove(index);
                        }
                    }
                }
            }
            if !rest.is_empty() {
                unprocessed.insert(table_name, rest);
            }
        }
        Ok(BatchWriteOutput { unprocessed })
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::types::AttributeValue;
    use dynoquery_core::expression::{equal, KeyCondition, Projection, SortCondition};
    use dynoquery_core::schema::SecondaryIndex;

    use super::*;

    fn schema() -> TableSchema {
        TableSchema::new("rooms", "pk")
            .unwrap()
            .with_sort_key("sk")
            .with_index(SecondaryIndex::new("by-type", "_type").with_sort_key("name"))
            .unwrap()
    }

    fn room(pk: &str, sk: &str, name: &str) -> Item {
        Item::from([
            ("pk".to_string(), AttributeValue::S(pk.to_string())),
            ("sk".to_string(), AttributeValue::S(sk.to_string())),
            ("_type".to_string(), AttributeValue::S("room".to_string())),
            ("name".to_string(), AttributeValue::S(name.to_string())),
        ])
    }

    async fn seeded(store: InMemoryStore) -> InMemoryStore {
        store.create_table(&schema()).await;
        for (sk, name) in [("r3", "c"), ("r1", "a"), ("r2", "b"), ("r4", "d")] {
            store
                .put_item(PutItemRequest {
                    table_name: "rooms".to_string(),
                    item: room("b1", sk, name),
                    condition: None,
                })
                .await
                .unwrap();
        }
        store
    }

    fn query(pk: &str) -> ReadRequest {
        let mut request = ReadRequest::new("rooms");
        request.key_condition = Some(KeyCondition::new("pk", pk).unwrap());
        request
    }

    fn names(page: &Page) -> Vec<String> {
        page.items
            .iter()
            .filter_map(|item| match item.get("name") {
                Some(AttributeValue::S(name)) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_query_returns_sort_order() {
        let store = seeded(InMemoryStore::new()).await;
        let page = store.query(&query("b1")).await.unwrap();
        assert_eq!(names(&page), vec!["a", "b", "c", "d"]);
        assert_eq!(page.last_evaluated_key, None);

        let mut reverse = query("b1");
        reverse.direction = Direction::Reverse;
        let page = store.query(&reverse).await.unwrap();
        assert_eq!(names(&page), vec!["d", "c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_query_pages_with_start_key() {
        let store = seeded(InMemoryStore::new().with_page_size(3)).await;
        let first = store.query(&query("b1")).await.unwrap();
        assert_eq!(names(&first), vec!["a", "b", "c"]);

        let mut next = query("b1");
        next.exclusive_start_key = first.last_evaluated_key.clone();
        let second = store.query(&next).await.unwrap();
        assert_eq!(names(&second), vec!["d"]);
        assert_eq!(second.last_evaluated_key, None);
    }

    #[tokio::test]
    async fn test_filter_applies_after_limit() {
        let store = seeded(InMemoryStore::new()).await;
        let mut request = query("b1");
        request.limit = Some(2);
        request.filter = Some(Condition::leaf("name", equal("b")));

        let page = store.query(&request).await.unwrap();
        assert_eq!(names(&page), vec!["b"]);
        assert_eq!(page.count, 1);
        assert_eq!(page.scanned_count, 2);
        assert!(page.last_evaluated_key.is_some());
    }

    #[tokio::test]
    async fn test_sort_condition_and_count() {
        let store = seeded(InMemoryStore::new()).await;
        let mut request = ReadRequest::new("rooms");
        request.key_condition = Some(
            KeyCondition::new("pk", "b1")
                .unwrap()
                .with_sort("sk", SortCondition::greater_than("r2"))
                .unwrap(),
        );
        request.select = Select::Count;

        let page = store.query(&request).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.count, 2);
    }

    #[tokio::test]
    async fn test_index_query_and_cursor_keys() {
        let store = seeded(InMemoryStore::new().with_page_size(1)).await;
        let mut request = ReadRequest::new("rooms");
        request.index_name = Some("by-type".to_string());
        request.key_condition = Some(KeyCondition::new("_type", "room").unwrap());

        let page = store.query(&request).await.unwrap();
        assert_eq!(names(&page), vec!["a"]);
        let cursor = page.last_evaluated_key.unwrap();
        let mut keys: Vec<_> = cursor.as_item().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["_type", "name", "pk", "sk"]);

        request.index_name = Some("missing".to_string());
        assert_eq!(store.query(&request).await, Err(StoreError::IndexNotFound));
    }

    #[tokio::test]
    async fn test_conditional_put_and_delete() {
        let store = seeded(InMemoryStore::new()).await;
        let guard = Condition::leaf("pk", dynoquery_core::expression::not_exists());

        let duplicate = store
            .put_item(PutItemRequest {
                table_name: "rooms".to_string(),
                item: room("b1", "r1", "again"),
                condition: Some(guard),
            })
            .await;
        assert_eq!(duplicate, Err(StoreError::ConditionalCheckFailed));

        let missing = store
            .delete_item(DeleteItemRequest {
                table_name: "rooms".to_string(),
                key: room("b9", "r1", "x"),
                condition: Some(Condition::leaf("pk", dynoquery_core::expression::exists())),
            })
            .await;
        assert_eq!(missing, Err(StoreError::ConditionalCheckFailed));
    }

    #[tokio::test]
    async fn test_get_with_projection() {
        let store = seeded(InMemoryStore::new()).await;
        let key = Item::from([
            ("pk".to_string(), AttributeValue::S("b1".to_string())),
            ("sk".to_string(), AttributeValue::S("r2".to_string())),
        ]);

        let item = store
            .get_item(GetItemRequest {
                table_name: "rooms".to_string(),
                key,
                projection: Projection::new(["name"]).unwrap(),
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.len(), 1);
        assert_eq!(item.get("name"), Some(&AttributeValue::S("b".to_string())));
    }

    #[tokio::test]
    async fn test_mixed_key_types_are_distinct() {
        let store = InMemoryStore::new();
        store.create_table(&schema()).await;
        let keyed = |sk: AttributeValue, name: &str| {
            let mut item = room("b1", "", name);
            item.insert("sk".to_string(), sk);
            item
        };
        for item in [
            keyed(AttributeValue::S("1".to_string()), "text"),
            keyed(AttributeValue::N("1".to_string()), "number"),
        ] {
            store
                .put_item(PutItemRequest {
                    table_name: "rooms".to_string(),
                    item,
                    condition: None,
                })
                .await
                .unwrap();
        }

        let page = store.query(&query("b1")).await.unwrap();
        assert_eq!(names(&page), vec!["number", "text"]);

        let item = store
            .get_item(GetItemRequest {
                table_name: "rooms".to_string(),
                key: Item::from([
                    ("pk".to_string(), AttributeValue::S("b1".to_string())),
                    ("sk".to_string(), AttributeValue::S("1".to_string())),
                ]),
                projection: Projection::all(),
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.get("name"), Some(&AttributeValue::S("text".to_string())));
    }

    #[tokio::test]
    async fn test_missing_table() {
        let store = InMemoryStore::new();
        assert_eq!(
            store.scan(&ReadRequest::new("nope")).await,
            Err(StoreError::ResourceNotFound)
        );
    }

    #[tokio::test]
    async fn test_batch_capacity_reports_unprocessed() {
        let store = seeded(InMemoryStore::new().with_batch_capacity(1)).await;
        let requests = BTreeMap::from([(
            "rooms".to_string(),
            vec![
                WriteRequest::Put(room("b2", "r1", "x")),
                WriteRequest::Put(room("b2", "r2", "y")),
            ],
        )]);

        let output = store
            .batch_write(BatchWriteRequest { requests })
            .await
            .unwrap();
        assert_eq!(output.unprocessed.get("rooms").map(Vec::len), Some(1));
        assert_eq!(store.items("rooms").await.len(), 5);
        assert_eq!(store.batch_calls(), 1);
    }
}
