//! Batch reads and writes: chunked, fanned out over a bounded worker pool,
//! with unprocessed entries retried a fixed number of times.

mod executor;
mod get;
mod update;
mod write;

pub use get::BatchGet;
pub use update::BatchUpdate;
pub use write::{BatchDelete, BatchUpsert};
