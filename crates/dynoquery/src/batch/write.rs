use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use dynoquery_core::batch::{BatchWriteSet, Chunk, WriteRequest};
use dynoquery_core::store::{BatchWriteRequest, Store};
use dynoquery_core::{Error, Item, Operation, Result};

use crate::batch::executor::{drain, run_bounded};
use crate::client::Client;
use crate::config::BatchPolicy;
use crate::hooks::Validate;
use crate::item::ItemBuilder;

async fn write_chunks(
    store: Arc<dyn Store>,
    policy: BatchPolicy,
    operation: Operation,
    chunks: Vec<Chunk<WriteRequest>>,
    concurrency: usize,
) -> Result<()> {
    debug!(operation = %operation, chunks = chunks.len(), "batch write");

    run_bounded(operation, chunks, concurrency, move |chunk| {
        let store = Arc::clone(&store);
        async move {
            drain(policy, operation, chunk, |requests| {
                let store = Arc::clone(&store);
                async move {
                    store
                        .batch_write(BatchWriteRequest { requests })
                        .await
                        .map(|output| output.unprocessed)
                        .map_err(|e| Error::from_store(operation, e))
                }
            })
            .await
        }
    })
    .await
}

/// Writes many records, 25 per request, replacing existing items.
#[derive(Debug)]
pub struct BatchUpsert {
    client: Client,
    writes: BatchWriteSet,
}

impl BatchUpsert {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            writes: BatchWriteSet::writes(),
        }
    }

    /// Validates and queues a record. A record that fails validation or
    /// serialization is not queued; the rest of the batch is unaffected.
    pub fn add<T: Serialize + Validate + ?Sized>(&mut self, record: &T) -> Result<()> {
        let item = self
            .client
            .prepare(Operation::BatchUpsert, record)
            .inspect_err(|e| warn!(error = %e, "record excluded from batch upsert"))?;
        self.writes.add_write(&self.client.schema().table_name, item);
        Ok(())
    }

    /// Queues an already serialized item without running validation.
    pub fn add_raw(&mut self, item: Item) -> Result<()> {
        self.client.check_key(Operation::BatchUpsert, &item)?;
        self.writes.add_write(&self.client.schema().table_name, item);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.writes.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Writes every queued record with at most `concurrency` requests in
    /// flight.
    pub async fn execute(self, concurrency: usize) -> Result<()> {
        write_chunks(
            Arc::clone(self.client.store()),
            self.client.batch_policy(),
            Operation::BatchUpsert,
            self.writes.into_chunks(),
            concurrency,
        )
        .await
    }
}

/// Deletes many items by full key, 25 per request.
#[derive(Debug)]
pub struct BatchDelete {
    client: Client,
    writes: BatchWriteSet,
    error: Option<Error>,
}

impl BatchDelete {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            writes: BatchWriteSet::writes(),
            error: None,
        }
    }

    /// Queues the key addressed by `builder`. The first invalid builder is
    /// kept and reported by [`Self::execute`].
    pub fn add(&mut self, builder: ItemBuilder) -> &mut Self {
        if self.error.is_none() {
            match builder.into_item_key(Operation::BatchDelete) {
                Ok((client, key)) => self.writes.add_delete(&client.schema().table_name, key),
                Err(e) => self.error = Some(e),
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.writes.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub async fn execute(self, concurrency: usize) -> Result<()> {
        if let Some(e) = self.error {
            return Err(e);
        }
        write_chunks(
            Arc::clone(self.client.store()),
            self.client.batch_policy(),
            Operation::BatchDelete,
            self.writes.into_chunks(),
            concurrency,
        )
        .await
    }
}
