//! Configuration for the eviction store

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};

/// Environment variable holding the byte budget
pub const ENV_MAX_BYTES: &str = "CACHEGROUP_MAX_BYTES";

/// Environment variable toggling hit/miss/eviction counters
pub const ENV_ENABLE_METRICS: &str = "CACHEGROUP_ENABLE_METRICS";

/// Configuration for a group's eviction store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum accounted bytes (key length + value length per entry).
    /// Zero disables eviction entirely.
    pub max_bytes: usize,

    /// Count hits, misses and evictions
    pub enable_metrics: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            // 64 MB
            max_bytes: 64 * 1024 * 1024,
            enable_metrics: true,
        }
    }
}

impl CacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Configuration with the given byte budget and default everything else
    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            ..Default::default()
        }
    }

    /// Check if eviction is disabled
    pub fn is_unbounded(&self) -> bool {
        self.max_bytes == 0
    }

    /// Validate the configuration
    ///
    /// Every byte budget is legal, including zero (unbounded), so this only
    /// rejects values too large to account for.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_bytes > isize::MAX as usize {
            return Err(format!(
                "max_bytes must not exceed {} bytes",
                isize::MAX
            ));
        }

        Ok(())
    }

    /// Load configuration from the environment, reading a `.env` file first
    /// when one is present
    ///
    /// Unset variables fall back to [`CacheConfig::default`].
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let max_bytes = match lookup(ENV_MAX_BYTES) {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| {
                CacheError::ConfigError(format!("{}={:?}: {}", ENV_MAX_BYTES, raw, e))
            })?,
            None => defaults.max_bytes,
        };

        let enable_metrics = match lookup(ENV_ENABLE_METRICS) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                CacheError::ConfigError(format!(
                    "{}={:?}: expected true/false",
                    ENV_ENABLE_METRICS, raw
                ))
            })?,
            None => defaults.enable_metrics,
        };

        let config = Self {
            max_bytes,
            enable_metrics,
        };
        config.validate().map_err(CacheError::ConfigError)?;
        Ok(config)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Builder for cache configuration
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    max_bytes: Option<usize>,
    enable_metrics: Option<bool>,
}

impl CacheConfigBuilder {
    /// Set maximum cache size in bytes (0 = unbounded)
    pub fn max_bytes(mut self, size: usize) -> Self {
        self.max_bytes = Some(size);
        self
    }

    /// Enable or disable metrics collection
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = Some(enable);
        self
    }

    /// Build the cache configuration
    pub fn build(self) -> CacheConfig {
        let defaults = CacheConfig::default();

        CacheConfig {
            max_bytes: self.max_bytes.unwrap_or(defaults.max_bytes),
            enable_metrics: self.enable_metrics.unwrap_or(defaults.enable_metrics),
        }
    }
}

/// Preset configurations for common use cases
impl CacheConfig {
    /// No byte budget; entries are never evicted
    pub fn unbounded() -> Self {
        Self::with_max_bytes(0)
    }

    /// Configuration for memory-constrained environments
    pub fn small() -> Self {
        Self::with_max_bytes(4 * 1024 * 1024) // 4 MB
    }

    /// Configuration for large datasets
    pub fn large() -> Self {
        Self::with_max_bytes(1024 * 1024 * 1024) // 1 GB
    }
}
