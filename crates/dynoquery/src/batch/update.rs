use std::sync::Arc;

use tracing::debug;

use dynoquery_core::store::UpdateItemRequest;
use dynoquery_core::{Error, Item, Operation, Result};

use crate::batch::executor::run_bounded;
use crate::client::Client;

/// Applies many attribute updates, one request per item.
#[derive(Debug)]
pub struct BatchUpdate {
    client: Client,
    requests: Vec<UpdateItemRequest>,
}

impl BatchUpdate {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            requests: Vec::new(),
        }
    }

    /// Queues an update. `attributes` must carry the full primary key; every
    /// other attribute is set on the item.
    pub fn add(&mut self, attributes: Item) -> Result<()> {
        let request = self.client.update_request(attributes)?;
        self.requests.push(request);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub async fn execute(self, concurrency: usize) -> Result<()> {
        debug!(updates = self.requests.len(), "batch update");
        let store = Arc::clone(self.client.store());

        run_bounded(Operation::Update, self.requests, concurrency, move |request| {
            let store = Arc::clone(&store);
            async move {
                store
                    .update_item(request)
                    .await
                    .map_err(|e| Error::from_store(Operation::Update, e))
            }
        })
        .await
    }
}
