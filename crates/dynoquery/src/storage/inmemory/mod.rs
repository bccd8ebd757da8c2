//! In-memory storage backend for testing.
//!
//! Tables live in a `HashMap` wrapped in `Arc<RwLock<_>>`. Reads honor
//! indexes, sort order, filters and page sizes the way DynamoDB does, and
//! batch calls can be capped to exercise the unprocessed-entry path.
//!
//! # Example
//!
//! ```rust,ignore
//! use dynoquery::storage::inmemory::InMemoryStore;
//!
//! let store = InMemoryStore::new().with_page_size(10);
//! store.create_table(client.schema()).await;
//! ```

mod store;

pub use store::InMemoryStore;
