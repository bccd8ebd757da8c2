use std::{env, time::Duration};

use dynoquery_core::schema::{SecondaryIndex, TableSchema};
use dynoquery_core::{Error, ErrorKind, Operation, Result};

/// Retry behavior for unprocessed batch entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    /// Follow-up requests per chunk after the first one (default: 3)
    pub max_retries: usize,
    /// Fixed pause before each follow-up request (default: 1s)
    pub retry_interval: Duration,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_interval: Duration::from_secs(1),
        }
    }
}

/// Client configuration: table layout plus connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub table_name: String,
    pub partition_key: String,
    pub sort_key: Option<String>,
    /// Separator for composite discriminator values, e.g. `#`
    pub key_separator: Option<String>,
    pub indexes: Vec<SecondaryIndex>,
    pub region: String,
    /// Endpoint override, e.g. `http://localhost:8000` for DynamoDB Local
    pub endpoint_url: Option<String>,
    /// Transport-level attempts for each request (default: 5)
    pub max_retries: u32,
    pub batch: BatchPolicy,
}

impl ClientConfig {
    pub fn new(table_name: impl Into<String>, partition_key: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            partition_key: partition_key.into(),
            sort_key: None,
            key_separator: None,
            indexes: Vec::new(),
            region: "us-east-1".to_string(),
            endpoint_url: None,
            max_retries: 5,
            batch: BatchPolicy::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DYNOQUERY_TABLE_NAME` - Table name (default: "dynoquery")
    /// - `DYNOQUERY_PARTITION_KEY` - Partition key attribute (default: "pk")
    /// - `DYNOQUERY_SORT_KEY` - Sort key attribute (default: none)
    /// - `DYNOQUERY_KEY_SEPARATOR` - Discriminator separator (default: none)
    /// - `DYNOQUERY_MAX_RETRIES` - Transport attempts (default: 5)
    /// - `AWS_REGION` - Region (default: "us-east-1")
    /// - `AWS_ENDPOINT_URL` - Endpoint override (default: none)
    pub fn from_env() -> Self {
        let non_empty = |name: &str| env::var(name).ok().filter(|v| !v.is_empty());

        Self {
            table_name: non_empty("DYNOQUERY_TABLE_NAME")
                .unwrap_or_else(|| "dynoquery".to_string()),
            partition_key: non_empty("DYNOQUERY_PARTITION_KEY").unwrap_or_else(|| "pk".to_string()),
            sort_key: non_empty("DYNOQUERY_SORT_KEY"),
            key_separator: non_empty("DYNOQUERY_KEY_SEPARATOR"),
            indexes: Vec::new(),
            region: non_empty("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            endpoint_url: non_empty("AWS_ENDPOINT_URL"),
            max_retries: env::var("DYNOQUERY_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            batch: BatchPolicy::default(),
        }
    }

    pub fn with_sort_key(mut self, sort_key: impl Into<String>) -> Self {
        self.sort_key = Some(sort_key.into());
        self
    }

    pub fn with_key_separator(mut self, separator: impl Into<String>) -> Self {
        self.key_separator = Some(separator.into());
        self
    }

    pub fn with_index(mut self, index: SecondaryIndex) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_batch_policy(mut self, batch: BatchPolicy) -> Self {
        self.batch = batch;
        self
    }

    /// Validates the table layout and builds the schema the client uses.
    pub fn schema(&self) -> Result<TableSchema> {
        let wrap = |kind| Error::new(Operation::NewClient, kind);

        let mut schema = TableSchema::new(&self.table_name, &self.partition_key).map_err(wrap)?;
        if let Some(sort_key) = &self.sort_key {
            schema = schema.with_sort_key(sort_key);
        }
        if let Some(separator) = &self.key_separator {
            schema = schema.with_key_separator(separator);
        }
        for index in &self.indexes {
            schema = schema.with_index(index.clone()).map_err(wrap)?;
        }
        Ok(schema)
    }

    /// Validates the connection settings.
    pub fn validate_connection(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(Error::new(Operation::NewClient, ErrorKind::MissingRegion));
        }
        Ok(())
    }
}
