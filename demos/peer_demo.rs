//! Peer Delegation Demo
//!
//! Runs two in-process "nodes", each with its own `scores` group, and routes
//! keys between them with a trivial picker. A third, unreachable peer shows
//! the fallback to the local origin.
//!
//! Usage:
//!   cargo run --example peer_demo
//!
//! Environment variables:
//!   RUST_LOG                  - log filter (default: cachegroup=debug,peer_demo=info)
//!   CACHEGROUP_MAX_BYTES      - byte budget for each node's store
//!   CACHEGROUP_ENABLE_METRICS - count hits, misses and evictions

use async_trait::async_trait;
use cachegroup::{
    BoxError, CacheConfig, CacheError, Getter, GetterFn, Group, PeerGetter, PeerPicker, Result,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Peer backed by another group in the same process
struct LocalPeer {
    node: String,
    group: Group,
}

#[async_trait]
impl PeerGetter for LocalPeer {
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>> {
        if group != self.group.name() {
            return Err(CacheError::Peer(format!(
                "{} has no group named {}",
                self.node, group
            )));
        }
        info!("{} serving {}/{}", self.node, group, key);
        Ok(self.group.get(key).await?.to_vec())
    }
}

/// Peer that is never reachable
struct DeadPeer;

#[async_trait]
impl PeerGetter for DeadPeer {
    async fn get(&self, _group: &str, key: &str) -> Result<Vec<u8>> {
        Err(CacheError::Peer(format!("connection refused for {}", key)))
    }
}

/// Sends keys starting with `a`..`m` to `remote`, `z` keys to a dead peer,
/// and keeps the rest local
struct RangePicker {
    remote: Arc<dyn PeerGetter>,
    dead: Arc<dyn PeerGetter>,
}

impl PeerPicker for RangePicker {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        match key.chars().next()?.to_ascii_lowercase() {
            'a'..='m' => Some(Arc::clone(&self.remote)),
            'z' => Some(Arc::clone(&self.dead)),
            _ => None,
        }
    }
}

fn origin(node: &'static str) -> Arc<dyn Getter> {
    let db: Arc<HashMap<&'static str, &'static str>> = Arc::new(HashMap::from([
        ("Jack", "589"),
        ("Sam", "567"),
        ("Tom", "630"),
        ("Zoe", "712"),
    ]));

    Arc::new(GetterFn::new(move |key: String| {
        let db = Arc::clone(&db);
        async move {
            info!("[{} origin] search key {}", node, key);
            db.get(key.as_str())
                .map(|v| v.as_bytes().to_vec())
                .ok_or_else(|| BoxError::from(format!("{} not exist", key)))
        }
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cachegroup=debug,peer_demo=info")),
        )
        .init();

    let config = CacheConfig::from_env()?;
    info!("=== Peer Delegation Demo (max_bytes: {}) ===", config.max_bytes);

    let node_b = Group::with_config("scores", config.clone(), origin("node-b"));
    let node_a = Group::with_config("scores", config, origin("node-a"));

    node_a.register_peers(RangePicker {
        remote: Arc::new(LocalPeer {
            node: "node-b".to_string(),
            group: node_b.clone(),
        }),
        dead: Arc::new(DeadPeer),
    })?;

    info!("\n--- Remote keys (owned by node-b) ---");
    for key in ["Jack", "Jack"] {
        let value = node_a.get(key).await?;
        info!("node-a got {} = {}", key, value);
    }

    info!("\n--- Local keys ---");
    for key in ["Sam", "Tom", "Tom"] {
        let value = node_a.get(key).await?;
        info!("node-a got {} = {}", key, value);
    }

    info!("\n--- Dead peer falls back to origin ---");
    let value = node_a.get("Zoe").await?;
    info!("node-a got Zoe = {}", value);

    info!("\n--- Unknown key ---");
    match node_a.get("Sam2").await {
        Ok(value) => info!("unexpected value: {}", value),
        Err(e) => info!("lookup failed as expected: {}", e),
    }

    info!("\n--- Statistics ---");
    info!("node-a: {:?}", node_a.stats());
    info!("node-a cache: {}", node_a.stats().cache);
    info!("node-b cache: {}", node_b.stats().cache);

    Ok(())
}
