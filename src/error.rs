//! Error types for cache group operations
//!
//! Only [`CacheError::EmptyKey`] and [`CacheError::Origin`] ever reach the
//! caller of [`Group::get`](crate::Group::get). Peer failures are absorbed by
//! the group and answered from the origin getter instead.

use std::sync::Arc;
use thiserror::Error;

/// Boxed error returned by user-supplied capabilities such as the origin getter
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for cache group operations
///
/// The type is `Clone` so that a single load result can be handed to every
/// caller waiting on the same key.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// The requested key was empty
    #[error("key is required")]
    EmptyKey,

    /// The origin getter failed; the getter's own error is kept as-is
    #[error(transparent)]
    Origin(Arc<dyn std::error::Error + Send + Sync>),

    /// A remote peer could not serve the request
    #[error("Peer error: {0}")]
    Peer(String),

    /// `register_peers` was called on a group that already has a picker
    #[error("peer picker already registered for group `{group}`")]
    PeersAlreadyRegistered { group: String },

    /// The shared load task ended without producing a result
    #[error("in-flight load for key `{key}` ended without a result")]
    LoadAborted { key: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

impl CacheError {
    /// Wrap an origin getter failure without altering it
    pub fn origin(err: BoxError) -> Self {
        CacheError::Origin(Arc::from(err))
    }

    /// Returns true if this error came from the origin getter
    pub fn is_origin(&self) -> bool {
        matches!(self, CacheError::Origin(_))
    }
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

impl From<String> for CacheError {
    fn from(s: String) -> Self {
        CacheError::Other(s)
    }
}

impl From<&str> for CacheError {
    fn from(s: &str) -> Self {
        CacheError::Other(s.to_string())
    }
}

impl From<crate::singleflight::LoadAborted> for CacheError {
    fn from(aborted: crate::singleflight::LoadAborted) -> Self {
        CacheError::LoadAborted { key: aborted.key }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        assert_eq!(CacheError::EmptyKey.to_string(), "key is required");

        let peer = CacheError::Peer("connection refused".to_string());
        assert_eq!(peer.to_string(), "Peer error: connection refused");

        let registered = CacheError::PeersAlreadyRegistered {
            group: "scores".to_string(),
        };
        assert!(registered.to_string().contains("`scores`"));
    }

    #[test]
    fn test_origin_error_is_transparent() {
        let source = io::Error::new(io::ErrorKind::NotFound, "Tom not exist");
        let error = CacheError::origin(Box::new(source));

        assert!(error.is_origin());
        assert_eq!(error.to_string(), "Tom not exist");

        let cloned = error.clone();
        assert_eq!(cloned.to_string(), error.to_string());
    }

    #[test]
    fn test_error_conversion() {
        let error: CacheError = "test error".into();
        assert!(matches!(error, CacheError::Other(_)));

        let error: CacheError = "test error".to_string().into();
        assert!(matches!(error, CacheError::Other(_)));

        let error: CacheError = crate::singleflight::LoadAborted {
            key: "k".to_string(),
        }
        .into();
        assert!(matches!(error, CacheError::LoadAborted { ref key } if key == "k"));
    }
}
