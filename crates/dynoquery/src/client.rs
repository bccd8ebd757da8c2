use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use dynoquery_core::expression::{not_exists, Condition};
use dynoquery_core::schema::TableSchema;
use dynoquery_core::store::{PutItemRequest, Store, UpdateItemRequest};
use dynoquery_core::{Error, ErrorKind, Item, KeyValue, Operation, Result};

use crate::batch::{BatchDelete, BatchGet, BatchUpdate, BatchUpsert};
use crate::config::{BatchPolicy, ClientConfig};
use crate::hooks::Validate;
use crate::item::ItemBuilder;

/// Entry point for every operation against one table.
///
/// Cloning is cheap: the store and schema are shared.
#[derive(Clone)]
pub struct Client {
    store: Arc<dyn Store>,
    schema: Arc<TableSchema>,
    batch: BatchPolicy,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("schema", &self.schema)
            .field("batch", &self.batch)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client over an existing store.
    pub fn with_store(config: &ClientConfig, store: Arc<dyn Store>) -> Result<Self> {
        let schema = config.schema()?;
        Ok(Self {
            store,
            schema: Arc::new(schema),
            batch: config.batch,
        })
    }

    /// Connects to DynamoDB with the given configuration.
    #[cfg(feature = "dynamodb")]
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        config.validate_connection()?;
        let schema = config.schema()?;
        let store = crate::storage::dynamodb::DynamoDbStore::connect(config).await;

        tracing::info!(
            table = %schema.table_name,
            region = %config.region,
            endpoint = config.endpoint_url.as_deref().unwrap_or("default"),
            indexes = schema.indexes().len(),
            "dynoquery client ready"
        );

        Ok(Self {
            store: Arc::new(store),
            schema: Arc::new(schema),
            batch: config.batch,
        })
    }

    /// Connects using [`ClientConfig::from_env`].
    #[cfg(feature = "dynamodb")]
    pub async fn from_env() -> Result<Self> {
        Self::connect(&ClientConfig::from_env()).await
    }

    /// A client for another table with the same key layout.
    pub fn table(&self, table_name: impl Into<String>) -> Result<Self> {
        let schema = self
            .schema
            .for_table(table_name)
            .map_err(|kind| Error::new(Operation::TableName, kind))?;
        Ok(Self {
            store: Arc::clone(&self.store),
            schema: Arc::new(schema),
            batch: self.batch,
        })
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub(crate) fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub(crate) fn batch_policy(&self) -> BatchPolicy {
        self.batch
    }

    /// Starts a builder addressing a partition of the base table.
    pub fn pk(&self, value: impl Into<KeyValue>) -> ItemBuilder {
        ItemBuilder::partition(self.clone(), value.into())
    }

    /// Starts a builder addressing a partition of a secondary index.
    pub fn index(&self, name: &str, value: impl Into<KeyValue>) -> ItemBuilder {
        ItemBuilder::on_index(self.clone(), name, value.into())
    }

    /// Starts a builder for a scan of a secondary index.
    pub fn index_scan(&self, name: &str) -> ItemBuilder {
        ItemBuilder::index_scan(self.clone(), name)
    }

    /// Starts a builder for a full table scan.
    pub fn table_scan(&self) -> ItemBuilder {
        ItemBuilder::table_scan(self.clone())
    }

    /// Creates a record, failing with "duplicate item" if its key exists.
    pub async fn create<T: Serialize + Validate + ?Sized>(&self, record: &T) -> Result<()> {
        let item = self.prepare(Operation::Create, record)?;
        let guard = self
            .schema
            .key_attributes()
            .into_iter()
            .map(|name| Condition::leaf(name, not_exists()))
            .reduce(Condition::and);

        self.store
            .put_item(PutItemRequest {
                table_name: self.schema.table_name.clone(),
                item,
                condition: guard,
            })
            .await
            .map_err(|e| Error::from_store(Operation::Create, e))
    }

    /// Writes a record, replacing any item with the same key.
    pub async fn upsert<T: Serialize + Validate + ?Sized>(&self, record: &T) -> Result<()> {
        let item = self.prepare(Operation::Upsert, record)?;
        self.store
            .put_item(PutItemRequest {
                table_name: self.schema.table_name.clone(),
                item,
                condition: None,
            })
            .await
            .map_err(|e| Error::from_store(Operation::Upsert, e))
    }

    /// Sets every non-key attribute of `attributes` on the addressed item.
    pub async fn update(&self, attributes: Item) -> Result<()> {
        let request = self.update_request(attributes)?;
        self.store
            .update_item(request)
            .await
            .map_err(|e| Error::from_store(Operation::Update, e))
    }

    pub(crate) fn update_request(&self, mut attributes: Item) -> Result<UpdateItemRequest> {
        self.check_key(Operation::Update, &attributes)?;
        let key = self.schema.key_of(&attributes);
        for name in key.keys() {
            attributes.remove(name);
        }
        let mut assignments: Vec<_> = attributes.into_iter().collect();
        assignments.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(UpdateItemRequest {
            table_name: self.schema.table_name.clone(),
            key,
            assignments,
            condition: None,
        })
    }

    /// Validates and serializes a record for writing.
    pub(crate) fn prepare<T: Serialize + Validate + ?Sized>(
        &self,
        operation: Operation,
        record: &T,
    ) -> Result<Item> {
        record
            .validate()
            .map_err(|e| Error::new(operation, ErrorKind::Validation(e.to_string())))?;
        let item: Item = serde_dynamo::to_item(record)
            .map_err(|e| Error::new(operation, ErrorKind::Serialization(e.to_string())))?;
        self.check_key(operation, &item)?;
        Ok(item)
    }

    /// Rejects items missing a key attribute or carrying an empty one.
    pub(crate) fn check_key(&self, operation: Operation, item: &Item) -> Result<()> {
        let present = |name: &str| {
            item.get(name)
                .and_then(|value| KeyValue::from_attribute(value).ok())
                .is_some_and(|value| !value.is_empty())
        };

        if !present(&self.schema.partition_key) {
            return Err(Error::new(operation, ErrorKind::EmptyPartitionKey));
        }
        if let Some(sort_key) = &self.schema.sort_key {
            if !present(sort_key) {
                return Err(Error::new(operation, ErrorKind::MissingSortKey));
            }
        }
        Ok(())
    }

    pub fn batch_get(&self) -> BatchGet {
        BatchGet::new(self.clone())
    }

    pub fn batch_upsert(&self) -> BatchUpsert {
        BatchUpsert::new(self.clone())
    }

    pub fn batch_delete(&self) -> BatchDelete {
        BatchDelete::new(self.clone())
    }

    pub fn batch_update(&self) -> BatchUpdate {
        BatchUpdate::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::types::AttributeValue;
    use serde::Deserialize;

    use super::*;
    use crate::hooks::HookError;
    use crate::storage::inmemory::InMemoryStore;
    use crate::SortCondition;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Room {
        pk: String,
        sk: String,
        name: String,
        size: i64,
    }

    impl Validate for Room {
        fn validate(&self) -> std::result::Result<(), HookError> {
            if self.name.is_empty() {
                return Err("name is required".into());
            }
            Ok(())
        }
    }

    fn room(sk: &str, name: &str) -> Room {
        Room {
            pk: "b1".to_string(),
            sk: sk.to_string(),
            name: name.to_string(),
            size: 4,
        }
    }

    async fn client() -> Client {
        let config = ClientConfig::new("rooms", "pk").with_sort_key("sk");
        let store = InMemoryStore::new();
        store.create_table(&config.schema().unwrap()).await;
        Client::with_store(&config, Arc::new(store)).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let client = client().await;
        client.create(&room("r1", "Lobby")).await.unwrap();

        let fetched: Option<Room> = client
            .pk("b1")
            .sk(SortCondition::equal("r1"))
            .get()
            .await
            .unwrap();
        assert_eq!(fetched, Some(room("r1", "Lobby")));
    }

    #[tokio::test]
    async fn test_create_duplicate_fails() {
        let client = client().await;
        client.create(&room("r1", "Lobby")).await.unwrap();

        let err = client.create(&room("r1", "Other")).await.unwrap_err();
        assert_eq!(err.to_string(), "Create(): duplicate item");
    }

    #[tokio::test]
    async fn test_upsert_replaces() {
        let client = client().await;
        client.upsert(&room("r1", "Lobby")).await.unwrap();
        client.upsert(&room("r1", "Hall")).await.unwrap();

        let fetched: Option<Room> = client
            .pk("b1")
            .sk(SortCondition::equal("r1"))
            .get()
            .await
            .unwrap();
        assert_eq!(fetched.map(|r| r.name), Some("Hall".to_string()));
    }

    #[tokio::test]
    async fn test_validation_failure_writes_nothing() {
        let client = client().await;
        let err = client.create(&room("r1", "")).await.unwrap_err();
        assert_eq!(
            err,
            Error::new(
                Operation::Create,
                ErrorKind::Validation("name is required".to_string())
            )
        );
        assert_eq!(client.table_scan().count().await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_missing_key_attribute_rejected() {
        let client = client().await;
        let err = client.upsert(&room("", "Lobby")).await.unwrap_err();
        assert_eq!(err, Error::new(Operation::Upsert, ErrorKind::MissingSortKey));
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let client = client().await;
        let fetched: Option<Room> = client
            .pk("b1")
            .sk(SortCondition::equal("nope"))
            .get()
            .await
            .unwrap();
        assert_eq!(fetched, None);
    }

    #[tokio::test]
    async fn test_delete_missing_key_fails() {
        let client = client().await;
        let err = client
            .pk("b1")
            .sk(SortCondition::equal("r9"))
            .delete()
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Delete(): key doesn't exist");

        client.create(&room("r9", "Attic")).await.unwrap();
        client
            .pk("b1")
            .sk(SortCondition::equal("r9"))
            .delete()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_sets_attributes() {
        let client = client().await;
        client.create(&room("r1", "Lobby")).await.unwrap();

        let attributes = Item::from([
            ("pk".to_string(), AttributeValue::S("b1".to_string())),
            ("sk".to_string(), AttributeValue::S("r1".to_string())),
            ("size".to_string(), AttributeValue::N("12".to_string())),
        ]);
        client.update(attributes).await.unwrap();

        let fetched: Option<Room> = client
            .pk("b1")
            .sk(SortCondition::equal("r1"))
            .get()
            .await
            .unwrap();
        assert_eq!(fetched.map(|r| (r.name, r.size)), Some(("Lobby".to_string(), 12)));
    }

    #[tokio::test]
    async fn test_update_request_splits_key() {
        let client = client().await;
        let request = client
            .update_request(Item::from([
                ("pk".to_string(), AttributeValue::S("b1".to_string())),
                ("sk".to_string(), AttributeValue::S("r1".to_string())),
                ("b".to_string(), AttributeValue::N("2".to_string())),
                ("a".to_string(), AttributeValue::N("1".to_string())),
            ]))
            .unwrap();

        assert_eq!(request.key.len(), 2);
        let names: Vec<_> = request.assignments.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_table_switch() {
        let client = client().await;
        let other = client.table("archive").unwrap();
        assert_eq!(other.schema().table_name, "archive");
        assert_eq!(other.schema().sort_key.as_deref(), Some("sk"));

        let err = other.create(&room("r1", "Lobby")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ResourceNotFound);

        assert_eq!(
            client.table("").unwrap_err(),
            Error::new(Operation::TableName, ErrorKind::EmptyTableName)
        );
    }
}
