//! Core type definitions for the cache system

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cache key type
pub type CacheKey = String;

/// Immutable view over a cached byte buffer
///
/// Clones share the same frozen buffer; nothing handed out by the store can
/// write into it. Use [`CacheValue::to_vec`] for an owned, mutable copy.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct CacheValue {
    bytes: Bytes,
}

impl CacheValue {
    /// Copy `data` into a fresh buffer, detaching it from the caller's memory
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(data),
        }
    }

    /// Adopt an owned buffer without copying
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self {
            bytes: Bytes::from(data),
        }
    }

    /// Size of the value in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the value holds no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrow the underlying bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Owned copy of the bytes
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Shared read-only handle to the buffer
    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }
}

impl AsRef<[u8]> for CacheValue {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<&'static str> for CacheValue {
    fn from(s: &'static str) -> Self {
        Self {
            bytes: Bytes::from_static(s.as_bytes()),
        }
    }
}

impl fmt::Display for CacheValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.bytes))
    }
}

impl fmt::Debug for CacheValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheValue")
            .field("len", &self.bytes.len())
            .field("bytes", &self.bytes)
            .finish()
    }
}

/// Statistics for a single eviction store
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of cache hits
    pub hits: u64,

    /// Total number of cache misses
    pub misses: u64,

    /// Number of entries currently in cache
    pub entries: usize,

    /// Bytes currently accounted (key length + value length per entry)
    pub size_bytes: usize,

    /// Configured byte budget, 0 when unbounded
    pub capacity_bytes: usize,

    /// Number of entries evicted to stay within the byte budget
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate cache hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    /// Calculate miss rate as a percentage
    pub fn miss_rate(&self) -> f64 {
        100.0 - self.hit_rate()
    }

    /// Average accounted size per entry
    pub fn avg_entry_size(&self) -> usize {
        if self.entries == 0 {
            0
        } else {
            self.size_bytes / self.entries
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ hits: {}, misses: {}, hit_rate: {:.2}%, entries: {}, size: {}/{} bytes, evictions: {} }}",
            self.hits,
            self.misses,
            self.hit_rate(),
            self.entries,
            self.size_bytes,
            self.capacity_bytes,
            self.evictions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_detaches_from_source() {
        let mut source = b"hello".to_vec();
        let value = CacheValue::copy_from_slice(&source);

        source[0] = b'j';

        assert_eq!(value.as_slice(), b"hello");
        assert_eq!(value.len(), 5);
    }

    #[test]
    fn test_to_vec_is_independent() {
        let value = CacheValue::from_vec(b"abc".to_vec());
        let mut copy = value.to_vec();
        copy.push(b'd');

        assert_eq!(value.as_slice(), b"abc");
        assert_eq!(copy, b"abcd");
    }

    #[test]
    fn test_value_display() {
        let value = CacheValue::from("630");
        assert_eq!(value.to_string(), "630");
        assert!(!value.is_empty());
        assert!(CacheValue::default().is_empty());
    }

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };

        assert_eq!(stats.hit_rate(), 80.0);
        assert_eq!(stats.miss_rate(), 20.0);
    }

    #[test]
    fn test_cache_stats_zero_requests() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
        assert_eq!(stats.miss_rate(), 100.0);
        assert_eq!(stats.avg_entry_size(), 0);
    }

    #[test]
    fn test_cache_stats_display() {
        let stats = CacheStats {
            hits: 100,
            misses: 50,
            entries: 4,
            size_bytes: 1024,
            capacity_bytes: 2048,
            evictions: 10,
        };

        let display = format!("{}", stats);
        assert!(display.contains("hits: 100"));
        assert!(display.contains("size: 1024/2048 bytes"));
        assert_eq!(stats.avg_entry_size(), 256);
    }
}
