//! Cache group orchestration
//!
//! A [`Group`] answers `get(key)` by trying, in order:
//!
//! 1. its local eviction store,
//! 2. a single deduplicated load per key, which asks the registered peer picker
//!    for a remote owner and fetches from it,
//! 3. the origin getter, whose result is copied into the local store.
//!
//! Only origin results are stored locally. A value fetched from a peer is
//! returned to the caller but never cached here, so every node caches only
//! what it computed itself.

use crate::cache::{CacheConfig, CacheStats, CacheValue, LruStore};
use crate::error::{BoxError, CacheError, Result};
use crate::peers::{PeerGetter, PeerPicker};
use crate::singleflight::SingleFlight;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

/// Authoritative data source consulted on a full cache miss
#[async_trait]
pub trait Getter: Send + Sync {
    /// Produce the bytes for `key`; any error fails this load attempt
    async fn get(&self, key: &str) -> std::result::Result<Vec<u8>, BoxError>;
}

/// Adapts an async closure into a [`Getter`]
///
/// ```rust
/// use cachegroup::{BoxError, GetterFn};
///
/// let getter = GetterFn::new(|key: String| async move {
///     Ok::<_, BoxError>(key.into_bytes())
/// });
/// # let _ = getter;
/// ```
pub struct GetterFn<F>(F);

impl<F> GetterFn<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F, Fut> Getter for GetterFn<F>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<Vec<u8>, BoxError>> + Send + 'static,
{
    async fn get(&self, key: &str) -> std::result::Result<Vec<u8>, BoxError> {
        (self.0)(key.to_string()).await
    }
}

/// Per-group counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStats {
    /// Calls to `get` with a non-empty key
    pub gets: u64,

    /// Calls answered from the local store
    pub local_hits: u64,

    /// Loads actually executed (one per flight)
    pub loads: u64,

    /// Callers that waited on a load started by another caller
    pub deduplicated: u64,

    /// Loads answered by a remote peer
    pub peer_loads: u64,

    /// Peer fetches that failed and fell back to the origin
    pub peer_errors: u64,

    /// Successful origin getter calls
    pub origin_loads: u64,

    /// Failed origin getter calls
    pub origin_errors: u64,

    /// Local eviction store counters
    pub cache: CacheStats,
}

#[derive(Default)]
struct GroupCounters {
    gets: AtomicU64,
    local_hits: AtomicU64,
    loads: AtomicU64,
    peer_loads: AtomicU64,
    peer_errors: AtomicU64,
    origin_loads: AtomicU64,
    origin_errors: AtomicU64,
}

impl GroupCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// A named cache namespace with its own getter, store and peer routing
///
/// Cloning a `Group` is cheap; clones share the same store and in-flight
/// loads.
#[derive(Clone)]
pub struct Group {
    inner: Arc<GroupInner>,
}

struct GroupInner {
    name: String,
    getter: Arc<dyn Getter>,
    main_cache: LruStore,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    loader: SingleFlight<CacheValue, CacheError>,
    counters: GroupCounters,
}

impl Group {
    /// Create a group whose store holds at most `cache_bytes` bytes
    /// (0 = unbounded)
    pub fn new(name: impl Into<String>, cache_bytes: usize, getter: impl Getter + 'static) -> Self {
        Self::with_config(name, CacheConfig::with_max_bytes(cache_bytes), Arc::new(getter))
    }

    /// Create a group from a full store configuration
    pub fn with_config(name: impl Into<String>, config: CacheConfig, getter: Arc<dyn Getter>) -> Self {
        Self::with_store(name, LruStore::new(config), getter)
    }

    /// Create a group around an existing store, e.g. one with an eviction
    /// callback
    pub fn with_store(name: impl Into<String>, store: LruStore, getter: Arc<dyn Getter>) -> Self {
        let name = name.into();
        info!(
            "Created cache group: {} (max_bytes: {})",
            name,
            store.capacity()
        );

        Self {
            inner: Arc::new(GroupInner {
                name,
                getter,
                main_cache: store,
                peers: OnceLock::new(),
                loader: SingleFlight::new(),
                counters: GroupCounters::default(),
            }),
        }
    }

    /// Register the peer picker used to delegate misses
    ///
    /// A group accepts exactly one picker.
    pub fn register_peers(&self, peers: impl PeerPicker + 'static) -> Result<()> {
        self.register_peers_arc(Arc::new(peers))
    }

    /// Register a shared peer picker
    pub fn register_peers_arc(&self, peers: Arc<dyn PeerPicker>) -> Result<()> {
        self.inner
            .peers
            .set(peers)
            .map_err(|_| CacheError::PeersAlreadyRegistered {
                group: self.inner.name.clone(),
            })?;
        info!("Registered peer picker for group: {}", self.inner.name);
        Ok(())
    }

    /// Get the value for `key`
    ///
    /// Empty keys are rejected before any store or load bookkeeping. Peer
    /// failures never surface here; the origin getter's error does, unchanged.
    ///
    /// Must be called from within a tokio runtime: a miss spawns the shared
    /// load onto it.
    pub async fn get(&self, key: &str) -> Result<CacheValue> {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }
        GroupCounters::bump(&self.inner.counters.gets);

        if let Some(value) = self.inner.main_cache.get(key) {
            GroupCounters::bump(&self.inner.counters.local_hits);
            debug!("[{}] local hit: {}", self.inner.name, key);
            return Ok(value);
        }

        self.load(key).await
    }

    async fn load(&self, key: &str) -> Result<CacheValue> {
        let inner = Arc::clone(&self.inner);
        let owned_key = key.to_string();
        self.inner
            .loader
            .run(key, move || async move { inner.load_uncached(&owned_key).await })
            .await
    }

    /// Group name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Number of entries in the local store
    pub fn cache_len(&self) -> usize {
        self.inner.main_cache.len()
    }

    /// Bytes accounted in the local store
    pub fn cache_bytes(&self) -> usize {
        self.inner.main_cache.size_bytes()
    }

    /// Check if `key` is in the local store without promoting it
    pub fn is_cached(&self, key: &str) -> bool {
        self.inner.main_cache.contains(key)
    }

    /// Check if a peer picker has been registered
    pub fn has_peers(&self) -> bool {
        self.inner.peers.get().is_some()
    }

    /// Snapshot of the group's counters
    pub fn stats(&self) -> GroupStats {
        let c = &self.inner.counters;
        GroupStats {
            gets: c.gets.load(Ordering::Relaxed),
            local_hits: c.local_hits.load(Ordering::Relaxed),
            loads: c.loads.load(Ordering::Relaxed),
            deduplicated: self.inner.loader.joined(),
            peer_loads: c.peer_loads.load(Ordering::Relaxed),
            peer_errors: c.peer_errors.load(Ordering::Relaxed),
            origin_loads: c.origin_loads.load(Ordering::Relaxed),
            origin_errors: c.origin_errors.load(Ordering::Relaxed),
            cache: self.inner.main_cache.stats(),
        }
    }
}

impl GroupInner {
    // Runs once per flight. Waiters on the same key never get here.
    async fn load_uncached(&self, key: &str) -> Result<CacheValue> {
        GroupCounters::bump(&self.counters.loads);

        if let Some(peer) = self.peers.get().and_then(|picker| picker.pick_peer(key)) {
            match self.get_from_peer(peer.as_ref(), key).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    GroupCounters::bump(&self.counters.peer_errors);
                    warn!("[{}] failed to get {} from peer: {}", self.name, key, e);
                }
            }
        }

        self.get_locally(key).await
    }

    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<CacheValue> {
        let bytes = peer.get(&self.name, key).await?;
        GroupCounters::bump(&self.counters.peer_loads);
        debug!("[{}] loaded {} from peer", self.name, key);
        Ok(CacheValue::from_vec(bytes))
    }

    async fn get_locally(&self, key: &str) -> Result<CacheValue> {
        let bytes = match self.getter.get(key).await {
            Ok(bytes) => bytes,
            Err(e) => {
                GroupCounters::bump(&self.counters.origin_errors);
                return Err(CacheError::origin(e));
            }
        };
        GroupCounters::bump(&self.counters.origin_loads);

        let value = CacheValue::copy_from_slice(&bytes);
        self.populate_cache(key, value.clone());
        Ok(value)
    }

    fn populate_cache(&self, key: &str, value: CacheValue) {
        self.main_cache.add(key, value);
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.inner.name)
            .field("main_cache", &self.inner.main_cache)
            .field("has_peers", &self.has_peers())
            .field("in_flight", &self.inner.loader.in_flight())
            .finish()
    }
}
