//! # Eviction Store
//!
//! A key/value table bounded by accounted bytes with least-recently-used
//! eviction.
//!
//! ## Features
//!
//! - **Byte Budget**: every entry is charged `key.len() + value.len()`; a
//!   budget of zero disables eviction
//! - **O(1) Recency**: slab-backed recency list plus a key index, so hits and
//!   inserts never scan
//! - **Eviction Callback**: optional hook invoked with each evicted entry
//! - **Immutable Values**: [`CacheValue`] is a frozen buffer, callers can never
//!   write through a handle they received from the store
//!
//! ## Example
//!
//! ```rust
//! use cachegroup::cache::{CacheConfig, CacheValue, LruStore};
//!
//! let store = LruStore::new(CacheConfig::builder().max_bytes(12).build());
//!
//! store.add("k1", CacheValue::from("value1"));
//! store.add("k2", CacheValue::from("value2"));
//!
//! // 12 bytes only fit one of the two entries
//! assert!(store.get("k1").is_none());
//! assert_eq!(store.get("k2").unwrap().as_slice(), b"value2");
//! ```

pub mod config;
pub mod entry;
mod list;
pub mod lru;
pub mod store;
pub mod types;

pub use config::{CacheConfig, CacheConfigBuilder};
pub use entry::EvictionEntry;
pub use lru::{EvictionCallback, Lru};
pub use store::LruStore;
pub use types::{CacheKey, CacheStats, CacheValue};
