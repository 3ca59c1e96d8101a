//! Thread-safe eviction store

use crate::cache::{
    config::CacheConfig,
    entry::EvictionEntry,
    lru::{EvictionCallback, Lru},
    types::{CacheStats, CacheValue},
};
use parking_lot::Mutex;
use std::fmt;
use tracing::{debug, info, warn};

/// Byte-bounded LRU store shared by all callers of a group
///
/// Every operation takes the store's own lock for in-memory bookkeeping only;
/// no lookup or load ever runs while it is held. The table itself is built on
/// first access so idle groups cost nothing.
pub struct LruStore {
    config: CacheConfig,
    inner: Mutex<Option<Lru>>,
    on_evicted: Mutex<Option<EvictionCallback>>,
}

impl LruStore {
    /// Create a store with the given configuration
    ///
    /// A byte budget beyond `isize::MAX` cannot be accounted for and is
    /// clamped to that bound.
    pub fn new(mut config: CacheConfig) -> Self {
        if let Err(e) = config.validate() {
            warn!("{}, clamping to {}", e, isize::MAX);
            config.max_bytes = isize::MAX as usize;
        }
        info!(
            "Initializing eviction store (max_bytes: {}, metrics: {})",
            config.max_bytes, config.enable_metrics
        );
        Self {
            config,
            inner: Mutex::new(None),
            on_evicted: Mutex::new(None),
        }
    }

    /// Create a store that reports every capacity eviction to `on_evicted`
    ///
    /// The callback runs while the store lock is held and must not call back
    /// into this store.
    pub fn with_eviction_callback(config: CacheConfig, on_evicted: EvictionCallback) -> Self {
        let store = Self::new(config);
        *store.on_evicted.lock() = Some(on_evicted);
        store
    }

    /// Look up `key`, promoting it on a hit
    pub fn get(&self, key: &str) -> Option<CacheValue> {
        let mut inner = self.inner.lock();
        let lru = inner.get_or_insert_with(|| self.build_lru());
        let value = lru.get(key);
        match &value {
            Some(_) => debug!("Cache hit: {}", key),
            None => debug!("Cache miss: {}", key),
        }
        value
    }

    /// Insert or replace `key`, evicting as needed to honour the byte budget
    pub fn add(&self, key: &str, value: CacheValue) {
        let mut inner = self.inner.lock();
        let lru = inner.get_or_insert_with(|| self.build_lru());
        lru.add(key, value);
    }

    /// Evict the least recently used entry
    pub fn remove_oldest(&self) -> Option<EvictionEntry> {
        self.inner.lock().as_mut()?.remove_oldest()
    }

    /// Check if `key` is present without promoting it
    pub fn contains(&self, key: &str) -> bool {
        self.inner
            .lock()
            .as_ref()
            .map_or(false, |lru| lru.contains(key))
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.inner.lock().as_ref().map_or(0, Lru::len)
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes currently accounted
    pub fn size_bytes(&self) -> usize {
        self.inner.lock().as_ref().map_or(0, Lru::used_bytes)
    }

    /// Configured byte budget, 0 when unbounded
    pub fn capacity(&self) -> usize {
        self.config.max_bytes
    }

    /// Store configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        match self.inner.lock().as_ref() {
            Some(lru) => lru.stats(),
            None => CacheStats {
                capacity_bytes: self.config.max_bytes,
                ..Default::default()
            },
        }
    }

    fn build_lru(&self) -> Lru {
        let lru = Lru::new(self.config.max_bytes).with_stats(self.config.enable_metrics);
        match self.on_evicted.lock().take() {
            Some(callback) => lru.with_eviction_callback(callback),
            None => lru,
        }
    }
}

impl Default for LruStore {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl fmt::Debug for LruStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruStore")
            .field("config", &self.config)
            .field("inner", &*self.inner.lock())
            .finish()
    }
}
