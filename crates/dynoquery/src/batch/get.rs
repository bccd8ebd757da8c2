use std::mem;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use dynoquery_core::batch::BatchKeySet;
use dynoquery_core::expression::Projection;
use dynoquery_core::store::BatchGetRequest;
use dynoquery_core::{Error, ErrorKind, Item, Operation, Result};

use crate::batch::executor::{drain, run_bounded};
use crate::client::Client;
use crate::item::ItemBuilder;
use crate::output::Output;

/// Reads many items by full key, 100 keys per request.
#[derive(Debug)]
pub struct BatchGet {
    client: Client,
    keys: BatchKeySet,
    projection: Projection,
    error: Option<Error>,
}

impl BatchGet {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            keys: BatchKeySet::reads(),
            projection: Projection::all(),
            error: None,
        }
    }

    /// Queues the key addressed by `builder`. The first invalid builder is
    /// kept and reported by [`Self::execute`].
    pub fn add(&mut self, builder: ItemBuilder) -> &mut Self {
        self.push(builder, false);
        self
    }

    /// Like [`Self::add`], but silently skips builders whose partition key
    /// is empty.
    pub fn add_omit_empty(&mut self, builder: ItemBuilder) -> &mut Self {
        self.push(builder, true);
        self
    }

    fn push(&mut self, builder: ItemBuilder, omit_empty: bool) {
        if self.error.is_some() {
            return;
        }
        match builder.into_item_key(Operation::BatchGet) {
            Ok((client, key)) => self.keys.add_read(&client.schema().table_name, key),
            Err(e) if omit_empty && e.kind == ErrorKind::EmptyPartitionKey => {}
            Err(e) => self.error = Some(e),
        }
    }

    /// Restricts the returned attributes for every key.
    pub fn project<I, S>(&mut self, attributes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match Projection::new(attributes) {
            Ok(projection) => self.projection = projection,
            Err(kind) => {
                self.error
                    .get_or_insert(Error::new(Operation::Projection, kind));
            }
        }
        self
    }

    /// Number of queued keys after deduplication.
    pub fn len(&self) -> usize {
        self.keys.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Fetches every queued key with at most `concurrency` requests in
    /// flight. Item order is unspecified.
    pub async fn execute(self, concurrency: usize) -> Result<Output> {
        if let Some(e) = self.error {
            return Err(e);
        }

        let store = Arc::clone(self.client.store());
        let policy = self.client.batch_policy();
        let projection = self.projection;
        let found = Arc::new(Mutex::new(Vec::<Item>::new()));
        let chunks = self.keys.into_chunks();
        debug!(chunks = chunks.len(), "batch get");

        let results = Arc::clone(&found);
        run_bounded(Operation::BatchGet, chunks, concurrency, move |chunk| {
            let store = Arc::clone(&store);
            let projection = projection.clone();
            let results = Arc::clone(&results);
            async move {
                drain(policy, Operation::BatchGet, chunk, |keys| {
                    let store = Arc::clone(&store);
                    let projection = projection.clone();
                    let results = Arc::clone(&results);
                    async move {
                        let output = store
                            .batch_get(BatchGetRequest { keys, projection })
                            .await
                            .map_err(|e| Error::from_store(Operation::BatchGet, e))?;
                        results.lock().await.extend(output.items);
                        Ok(output.unprocessed)
                    }
                })
                .await
            }
        })
        .await?;

        let items = mem::take(&mut *found.lock().await);
        Ok(Output::new(items, None).with_discriminator(
            self.client
                .schema()
                .default_discriminator()
                .map(str::to_string),
            self.client.schema().key_separator.clone(),
        ))
    }
}
