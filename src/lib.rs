//! # cachegroup
//!
//! An embeddable, in-process cache layer organised in named groups.
//!
//! ## Features
//!
//! - Byte-bounded LRU eviction store with O(1) hits and inserts
//! - Concurrent lookups for the same key collapse into a single load
//! - Optional delegation of misses to a remote peer, with fallback to the
//!   local origin getter when the peer fails
//! - Named group registry shared across a program
//! - Async-first design using tokio
//!
//! ## Lookup Flow
//!
//! ```text
//! Group::get(key)
//!   ├─ local store hit ───────────────────────────► value
//!   └─ miss ─► deduplicated load (one per key)
//!                ├─ peer picked and fetch ok ─────► value (not stored locally)
//!                └─ no peer / peer failed
//!                     └─ origin getter ─► copy ─► store ─► value
//! ```
//!
//! ## Example
//!
//! ```rust
//! use cachegroup::{BoxError, GetterFn, GroupRegistry};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = GroupRegistry::new();
//!
//!     registry.register(
//!         "scores",
//!         2 << 10,
//!         GetterFn::new(|key: String| async move {
//!             match key.as_str() {
//!                 "Tom" => Ok(b"630".to_vec()),
//!                 _ => Err(BoxError::from(format!("{} not exist", key))),
//!             }
//!         }),
//!     );
//!
//!     let scores = registry.get("scores").expect("registered above");
//!     let value = scores.get("Tom").await?;
//!     assert_eq!(value.as_slice(), b"630");
//!
//!     // Served from the local store this time
//!     let value = scores.get("Tom").await?;
//!     assert_eq!(value.to_string(), "630");
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;
pub mod group;
pub mod peers;
pub mod registry;
pub mod singleflight;

// Re-export main types for convenience
pub use cache::{
    CacheConfig, CacheConfigBuilder, CacheKey, CacheStats, CacheValue, EvictionCallback,
    EvictionEntry, Lru, LruStore,
};
pub use error::{BoxError, CacheError, Result};
pub use group::{Getter, GetterFn, Group, GroupStats};
pub use peers::{NoPeers, PeerGetter, PeerPicker};
pub use registry::GroupRegistry;
pub use singleflight::{LoadAborted, SingleFlight};
