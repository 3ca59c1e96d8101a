//! Entries held by the eviction store

use crate::cache::types::{CacheKey, CacheValue};

/// A key/value pair tracked by the recency list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvictionEntry {
    /// The cache key
    pub key: CacheKey,

    /// The cached value
    pub value: CacheValue,
}

impl EvictionEntry {
    /// Create a new entry
    pub fn new(key: CacheKey, value: CacheValue) -> Self {
        Self { key, value }
    }

    /// Bytes charged against the store's budget for this entry
    pub fn size(&self) -> usize {
        entry_size(&self.key, &self.value)
    }
}

/// Accounted size of a key/value pair: key length plus value length
pub fn entry_size(key: &str, value: &CacheValue) -> usize {
    key.len() + value.len()
}
