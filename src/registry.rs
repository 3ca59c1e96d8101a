//! Named group directory
//!
//! Lets independently initialised parts of a program resolve the same
//! [`Group`] by name. Lookups take a shared read lock, so readers never block
//! each other; registration takes the write lock only for the map insert.

use crate::cache::CacheConfig;
use crate::group::{Getter, Group};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

/// Directory of cache groups keyed by name
///
/// Entries live as long as the registry; there is no removal. Registering a
/// name twice replaces the earlier group, which is the caller's
/// responsibility to avoid.
#[derive(Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Group>>,
}

impl GroupRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry, created on first use
    pub fn global() -> &'static GroupRegistry {
        static GLOBAL: OnceLock<GroupRegistry> = OnceLock::new();
        GLOBAL.get_or_init(GroupRegistry::new)
    }

    /// Create a group with a `cache_bytes` budget and register it under `name`
    pub fn register(
        &self,
        name: impl Into<String>,
        cache_bytes: usize,
        getter: impl Getter + 'static,
    ) -> Group {
        self.register_with_config(name, CacheConfig::with_max_bytes(cache_bytes), Arc::new(getter))
    }

    /// Create a group from a full configuration and register it under `name`
    pub fn register_with_config(
        &self,
        name: impl Into<String>,
        config: CacheConfig,
        getter: Arc<dyn Getter>,
    ) -> Group {
        let group = Group::with_config(name, config, getter);
        self.insert(group.clone());
        group
    }

    /// Register an already constructed group under its own name
    pub fn insert(&self, group: Group) {
        let name = group.name().to_string();
        let previous = self.groups.write().insert(name.clone(), group);
        match previous {
            Some(_) => warn!("Replaced registered cache group: {}", name),
            None => info!("Registered cache group: {}", name),
        }
    }

    /// Look up a group by name
    pub fn get(&self, name: &str) -> Option<Group> {
        self.groups.read().get(name).cloned()
    }

    /// Registered group names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered groups
    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    /// Check if no group is registered
    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::group::GetterFn;

    fn echo() -> impl Getter {
        GetterFn::new(|key: String| async move { Ok::<_, BoxError>(key.into_bytes()) })
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let registry = GroupRegistry::new();
        assert!(registry.is_empty());

        let group = registry.register("scores", 2 << 10, echo());
        let found = registry.get("scores").unwrap();

        assert_eq!(found.name(), "scores");
        assert!(registry.get("missing").is_none());

        // Same underlying group: a value loaded through one handle is cached
        // for the other.
        group.get("Tom").await.unwrap();
        assert!(found.is_cached("Tom"));
    }

    #[tokio::test]
    async fn test_reusing_name_replaces_group() {
        let registry = GroupRegistry::new();
        let first = registry.register("scores", 0, echo());
        first.get("a").await.unwrap();

        registry.register("scores", 0, echo());

        assert_eq!(registry.len(), 1);
        assert!(!registry.get("scores").unwrap().is_cached("a"));
    }

    #[test]
    fn test_names_sorted() {
        let registry = GroupRegistry::new();
        registry.register("b", 0, echo());
        registry.register("a", 0, echo());

        assert_eq!(registry.names(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_global_is_shared() {
        let name = "registry-test-global";
        GroupRegistry::global().register(name, 0, echo());

        assert!(GroupRegistry::global().get(name).is_some());
        assert!(std::ptr::eq(GroupRegistry::global(), GroupRegistry::global()));
    }
}
