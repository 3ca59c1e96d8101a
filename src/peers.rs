//! Peer delegation contracts
//!
//! The group only consumes these traits. How peers are chosen (consistent
//! hashing, static assignment, ...) and how they are reached (HTTP, RPC, ...)
//! belongs to the embedding application.

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Fetches a value from one already-selected remote peer
#[async_trait]
pub trait PeerGetter: Send + Sync {
    /// Retrieve `key` from the group named `group` on this peer
    ///
    /// The returned buffer is adopted as-is by the group, so implementations
    /// must hand over a buffer they no longer touch.
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>>;
}

/// Chooses which remote peer, if any, owns a key
pub trait PeerPicker: Send + Sync {
    /// Return the owning peer for `key`, or `None` to handle it locally
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

/// Picker that never delegates; every key is handled locally
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPeers;

impl PeerPicker for NoPeers {
    fn pick_peer(&self, _key: &str) -> Option<Arc<dyn PeerGetter>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;

    struct Unreachable;

    #[async_trait]
    impl PeerGetter for Unreachable {
        async fn get(&self, _group: &str, key: &str) -> Result<Vec<u8>> {
            Err(CacheError::Peer(format!("no route for {}", key)))
        }
    }

    struct Always(Arc<dyn PeerGetter>);

    impl PeerPicker for Always {
        fn pick_peer(&self, _key: &str) -> Option<Arc<dyn PeerGetter>> {
            Some(Arc::clone(&self.0))
        }
    }

    #[test]
    fn test_no_peers_picks_nothing() {
        assert!(NoPeers.pick_peer("anything").is_none());
    }

    #[tokio::test]
    async fn test_picker_returns_shared_getter() {
        let picker = Always(Arc::new(Unreachable));
        let peer = picker.pick_peer("k").unwrap();

        let err = peer.get("scores", "k").await.unwrap_err();
        assert_eq!(err.to_string(), "Peer error: no route for k");
    }
}
