//! Partitioning of batch requests into store-sized chunks.
//!
//! A chunk maps table names to the entries destined for that table. Only
//! the most recently opened chunk accepts entries; once it reaches the
//! maximum it is sealed and the next entry opens a new one.

use std::collections::BTreeMap;

use crate::value::Item;

/// Maximum keys in one batch-get request.
pub const MAX_READ_CHUNK: usize = 100;

/// Maximum put/delete requests in one batch-write request.
pub const MAX_WRITE_CHUNK: usize = 25;

/// One entry of a batch-write request.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteRequest {
    Put(Item),
    Delete(Item),
}

/// Entries of one chunk, grouped by table.
pub type Chunk<E> = BTreeMap<String, Vec<E>>;

#[derive(Debug, Clone)]
pub struct ChunkSet<E> {
    max: usize,
    dedupe: bool,
    chunks: BTreeMap<usize, Chunk<E>>,
    open_len: usize,
}

/// Keys for a batch-get, deduplicated within each chunk.
pub type BatchKeySet = ChunkSet<Item>;

/// Puts or deletes for a batch-write, never deduplicated.
pub type BatchWriteSet = ChunkSet<WriteRequest>;

impl<E: PartialEq> ChunkSet<E> {
    fn with_limit(max: usize, dedupe: bool) -> Self {
        Self {
            max,
            dedupe,
            chunks: BTreeMap::new(),
            open_len: 0,
        }
    }

    fn push(&mut self, table: &str, entry: E) {
        let open = self.chunks.len().checked_sub(1);
        let index = match open {
            Some(index) if self.open_len < self.max => index,
            _ => {
                let index = self.chunks.len();
                self.chunks.insert(index, Chunk::new());
                self.open_len = 0;
                index
            }
        };

        let Some(chunk) = self.chunks.get_mut(&index) else {
            return;
        };
        let entries = chunk.entry(table.to_string()).or_default();
        if self.dedupe && entries.contains(&entry) {
            return;
        }
        entries.push(entry);
        self.open_len += 1;
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunk(&self, index: usize) -> Option<&Chunk<E>> {
        self.chunks.get(&index)
    }

    /// Total entries in a chunk, across tables.
    pub fn chunk_len(&self, index: usize) -> usize {
        self.chunks
            .get(&index)
            .map(|chunk| chunk.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// Total entries across all chunks.
    pub fn entry_count(&self) -> usize {
        (0..self.chunks.len()).map(|i| self.chunk_len(i)).sum()
    }

    /// Chunks in the order they were opened.
    pub fn into_chunks(self) -> Vec<Chunk<E>> {
        self.chunks.into_values().collect()
    }
}

impl ChunkSet<Item> {
    pub fn reads() -> Self {
        Self::with_limit(MAX_READ_CHUNK, true)
    }

    pub fn add_read(&mut self, table: &str, key: Item) {
        self.push(table, key);
    }
}

impl ChunkSet<WriteRequest> {
    pub fn writes() -> Self {
        Self::with_limit(MAX_WRITE_CHUNK, false)
    }

    pub fn add_write(&mut self, table: &str, item: Item) {
        self.push(table, WriteRequest::Put(item));
    }

    pub fn add_delete(&mut self, table: &str, key: Item) {
        self.push(table, WriteRequest::Delete(key));
    }
}

impl Default for ChunkSet<Item> {
    fn default() -> Self {
        Self::reads()
    }
}

impl Default for ChunkSet<WriteRequest> {
    fn default() -> Self {
        Self::writes()
    }
}
