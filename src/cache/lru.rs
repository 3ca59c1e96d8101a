//! Byte-bounded LRU table
//!
//! [`Lru`] is the single-threaded core: a key index over a recency list plus
//! a running byte count. Thread-safe access goes through
//! [`LruStore`](crate::cache::LruStore).

use crate::cache::{
    entry::{entry_size, EvictionEntry},
    list::{RecencyList, SlotIdx},
    types::{CacheStats, CacheValue},
};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Callback invoked with every entry evicted for capacity
///
/// Runs synchronously inside [`Lru::add`]. Calling back into the same store
/// from the callback is undefined behaviour: through [`LruStore`] it deadlocks
/// on the store's own lock.
///
/// [`LruStore`]: crate::cache::LruStore
pub type EvictionCallback = Box<dyn Fn(&str, &CacheValue) + Send + Sync>;

/// Least-recently-used table bounded by accounted bytes
pub struct Lru {
    /// Byte budget, 0 disables eviction
    max_bytes: usize,

    /// Sum of key length + value length over all live entries
    used_bytes: usize,

    /// Recency order: front is least recently used
    order: RecencyList<EvictionEntry>,

    /// Key -> position in `order`
    index: HashMap<String, SlotIdx>,

    on_evicted: Option<EvictionCallback>,

    stats: CacheStats,
    track_stats: bool,
}

impl Lru {
    /// Create a table with the given byte budget (0 = unbounded)
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            used_bytes: 0,
            order: RecencyList::new(),
            index: HashMap::new(),
            on_evicted: None,
            stats: CacheStats::default(),
            track_stats: true,
        }
    }

    /// Register the eviction callback
    pub fn with_eviction_callback(mut self, on_evicted: EvictionCallback) -> Self {
        self.on_evicted = Some(on_evicted);
        self
    }

    /// Enable or disable hit/miss/eviction counters
    pub fn with_stats(mut self, enable: bool) -> Self {
        self.track_stats = enable;
        self
    }

    /// Look up `key`, promoting it to most recently used on a hit
    pub fn get(&mut self, key: &str) -> Option<CacheValue> {
        let Some(&idx) = self.index.get(key) else {
            if self.track_stats {
                self.stats.misses += 1;
            }
            return None;
        };

        self.order.move_to_back(idx);
        if self.track_stats {
            self.stats.hits += 1;
        }
        self.order.get(idx).map(|entry| entry.value.clone())
    }

    /// Look up `key` without touching its recency
    pub fn peek(&self, key: &str) -> Option<&CacheValue> {
        let idx = self.index.get(key)?;
        self.order.get(*idx).map(|entry| &entry.value)
    }

    /// Check if `key` is present without touching its recency
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Insert or replace `key`, then evict least recently used entries until
    /// the byte budget holds again
    ///
    /// A value larger than the whole budget is still admitted and then evicted
    /// along with everything else.
    pub fn add(&mut self, key: &str, value: CacheValue) {
        if let Some(&idx) = self.index.get(key) {
            self.order.move_to_back(idx);
            if let Some(entry) = self.order.get_mut(idx) {
                self.used_bytes = self.used_bytes + value.len() - entry.value.len();
                entry.value = value;
            }
            debug!("Updated cache entry: {}", key);
        } else {
            self.used_bytes += entry_size(key, &value);
            let idx = self
                .order
                .push_back(EvictionEntry::new(key.to_string(), value));
            self.index.insert(key.to_string(), idx);
            debug!("Inserted cache entry: {}", key);
        }

        while self.max_bytes != 0 && self.used_bytes > self.max_bytes {
            if self.remove_oldest().is_none() {
                break;
            }
        }
    }

    /// Evict the least recently used entry, notifying the eviction callback
    pub fn remove_oldest(&mut self) -> Option<EvictionEntry> {
        let entry = self.order.pop_front()?;
        self.index.remove(&entry.key);
        self.used_bytes -= entry.size();
        if self.track_stats {
            self.stats.evictions += 1;
        }
        debug!(
            "Evicted cache entry: {} ({} bytes, {} in use)",
            entry.key,
            entry.size(),
            self.used_bytes
        );

        if let Some(on_evicted) = &self.on_evicted {
            on_evicted(&entry.key, &entry.value);
        }
        Some(entry)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.order.len() == 0
    }

    /// Bytes currently accounted
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    /// Configured byte budget
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Keys from least to most recently used
    pub fn keys(&self) -> Vec<String> {
        self.order.iter().map(|entry| entry.key.clone()).collect()
    }

    /// Drop every entry without invoking the eviction callback
    pub fn clear(&mut self) {
        self.order.clear();
        self.index.clear();
        self.used_bytes = 0;
    }

    /// Snapshot of the table's counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            size_bytes: self.used_bytes,
            capacity_bytes: self.max_bytes,
            ..self.stats.clone()
        }
    }
}

impl fmt::Debug for Lru {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lru")
            .field("max_bytes", &self.max_bytes)
            .field("used_bytes", &self.used_bytes)
            .field("len", &self.len())
            .field("on_evicted", &self.on_evicted.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn value(s: &'static str) -> CacheValue {
        CacheValue::from(s)
    }

    #[test]
    fn test_get() {
        let mut lru = Lru::new(0);
        lru.add("key1", value("1234"));

        assert_eq!(lru.get("key1"), Some(value("1234")));
        assert_eq!(lru.get("key2"), None);

        let stats = lru.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_remove_oldest() {
        let (k1, k2, k3) = ("key1", "key2", "k3");
        let (v1, v2, v3) = ("value1", "value2", "v3");
        let cap = k1.len() + k2.len() + v1.len() + v2.len();

        let mut lru = Lru::new(cap);
        lru.add(k1, value(v1));
        lru.add(k2, value(v2));
        lru.add(k3, value(v3));

        assert!(lru.get("key1").is_none());
        assert_eq!(lru.len(), 2);
        assert!(lru.used_bytes() <= cap);
    }

    #[test]
    fn test_get_promotes_entry() {
        // Room for exactly two 4-byte entries
        let mut lru = Lru::new(8);
        lru.add("a", value("111"));
        lru.add("b", value("222"));

        assert!(lru.get("a").is_some());
        lru.add("c", value("333"));

        assert!(lru.contains("a"));
        assert!(!lru.contains("b"));
        assert!(lru.contains("c"));
        assert_eq!(lru.keys(), vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_on_evicted() {
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);
        let callback: EvictionCallback = Box::new(move |key, _value| {
            sink.lock().unwrap().push(key.to_string());
        });

        let mut lru = Lru::new(10).with_eviction_callback(callback);
        lru.add("key1", value("123456"));
        lru.add("k2", value("k2"));
        lru.add("k3", value("k3"));
        lru.add("k4", value("k4"));

        assert_eq!(*evicted.lock().unwrap(), vec!["key1", "k2"]);
        assert_eq!(lru.stats().evictions, 2);
    }

    #[test]
    fn test_update_adjusts_used_bytes() {
        let mut lru = Lru::new(0);
        lru.add("k", value("12345"));
        assert_eq!(lru.used_bytes(), 6);

        lru.add("k", value("12"));
        assert_eq!(lru.used_bytes(), 3);
        assert_eq!(lru.len(), 1);

        lru.add("k", value("1234567890"));
        assert_eq!(lru.used_bytes(), 11);
        assert_eq!(lru.peek("k"), Some(&value("1234567890")));
    }

    #[test]
    fn test_update_promotes_entry() {
        let mut lru = Lru::new(8);
        lru.add("a", value("111"));
        lru.add("b", value("222"));
        lru.add("a", value("999"));
        lru.add("c", value("333"));

        assert_eq!(lru.keys(), vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_oversized_value_evicts_itself() {
        let mut lru = Lru::new(4);
        lru.add("a", value("1"));
        lru.add("big", value("far too large"));

        assert!(lru.is_empty());
        assert_eq!(lru.used_bytes(), 0);
        assert_eq!(lru.stats().evictions, 2);
    }

    #[test]
    fn test_zero_capacity_never_evicts() {
        let mut lru = Lru::new(0);
        for i in 0..1000 {
            lru.add(&format!("key{}", i), value("some reasonably long value"));
        }
        assert_eq!(lru.len(), 1000);
        assert_eq!(lru.stats().evictions, 0);
    }

    #[test]
    fn test_stats_disabled() {
        let mut lru = Lru::new(2).with_stats(false);
        lru.add("a", value("b"));
        lru.add("c", value("d"));
        lru.get("c");
        lru.get("missing");

        let stats = lru.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_clear() {
        let mut lru = Lru::new(0);
        lru.add("a", value("1"));
        lru.add("b", value("2"));
        lru.clear();

        assert!(lru.is_empty());
        assert_eq!(lru.used_bytes(), 0);
        assert!(lru.get("a").is_none());
    }
}
