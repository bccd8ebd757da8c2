//! dynoquery - fluent query, batch and pagination builder for DynamoDB.
//!
//! ```no_run
//! # async fn example() -> dynoquery::Result<()> {
//! use dynoquery::{Client, ClientConfig, SortCondition};
//!
//! let config = ClientConfig::new("rooms", "pk").with_sort_key("sk");
//! let client = Client::connect(&config).await?;
//!
//! let output = client
//!     .pk("building#1")
//!     .sk(SortCondition::begins_with("room#"))
//!     .filter("status", dynoquery::expression::equal("open"))
//!     .limit(20)
//!     .query()
//!     .await?;
//! println!("{} rooms, resume at {:?}", output.len(), output.cursor());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod client;
pub mod config;
pub mod hooks;
pub mod item;
pub mod output;
mod paginate;
pub mod storage;

pub use batch::{BatchDelete, BatchGet, BatchUpdate, BatchUpsert};
pub use client::Client;
pub use config::{BatchPolicy, ClientConfig};
pub use hooks::{Authorize, HookError, Records, Validate};
pub use item::ItemBuilder;
pub use output::{Output, UnmarshalOptions};

pub use dynoquery_core::expression::{self, Condition, Predicate, Projection, SortCondition};
pub use dynoquery_core::pagination::{Counts, Cursor, Direction};
pub use dynoquery_core::schema::{SecondaryIndex, TableSchema};
pub use dynoquery_core::{Error, ErrorKind, Item, KeyValue, Operation, Result, Value};
