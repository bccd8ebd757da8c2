//! dynoquery_core - pure model for the dynoquery builder.
//!
//! Everything in this crate is synchronous and free of I/O: key and filter
//! expressions, the batch partitioner, the pagination state machine, the
//! discriminator used to classify mixed records, and the `Store` trait that
//! the shell crate implements against DynamoDB and in memory.

pub mod batch;
pub mod discriminator;
pub mod error;
pub mod expression;
pub mod pagination;
pub mod schema;
pub mod store;
pub mod value;

pub use error::{Error, ErrorKind, Operation, Result};
pub use value::{Item, KeyValue, Value};
