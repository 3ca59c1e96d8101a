//! Call deduplication for concurrent loads
//!
//! [`SingleFlight::run`] collapses concurrent calls sharing a key into one
//! execution. The first caller spawns the load onto the runtime; everyone who
//! arrives while it is in flight awaits the same shared channel and receives a
//! clone of the same result. Once the load finishes its record is dropped, so
//! the next call starts over. This deduplicates concurrent work only and never
//! caches a result.
//!
//! Because the load runs on its own task, a caller that drops its `run` future
//! does not cancel the load for the others.

use futures::future::{FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, warn};

type Flight<V, E> = Shared<oneshot::Receiver<Result<V, E>>>;

type FlightMap<V, E> = Arc<Mutex<HashMap<String, Flight<V, E>>>>;

/// The load task for `key` finished without sending a result, because it
/// panicked or the runtime shut down underneath it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("in-flight load for key `{key}` ended without a result")]
pub struct LoadAborted {
    /// Key whose load was lost
    pub key: String,
}

/// Deduplicates concurrent loads per key
pub struct SingleFlight<V, E> {
    calls: FlightMap<V, E>,

    /// Callers that joined a load someone else started
    joined: AtomicU64,
}

impl<V, E> SingleFlight<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<LoadAborted> + 'static,
{
    /// Create a deduplicator with no loads in flight
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(HashMap::new())),
            joined: AtomicU64::new(0),
        }
    }

    /// Run `load` for `key` unless a load for `key` is already in flight, in
    /// which case wait for that one instead
    ///
    /// `load` is only called by the caller that starts the flight. Must be
    /// called from within a tokio runtime.
    pub async fn run<F, Fut>(&self, key: &str, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let (flight, sender) = {
            let mut calls = self.calls.lock();
            match calls.get(key) {
                Some(flight) => (flight.clone(), None),
                None => {
                    let (tx, rx) = oneshot::channel();
                    let flight = rx.shared();
                    calls.insert(key.to_string(), flight.clone());
                    (flight, Some(tx))
                }
            }
        };

        match sender {
            Some(tx) => self.spawn_flight(key, tx, load()),
            None => {
                self.joined.fetch_add(1, Ordering::Relaxed);
                debug!("Joined in-flight load: {}", key);
            }
        }

        match flight.await {
            Ok(result) => result,
            Err(_) => Err(E::from(LoadAborted {
                key: key.to_string(),
            })),
        }
    }

    /// Number of keys with a load in flight
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }

    /// Total callers that were served by a load started by another caller
    pub fn joined(&self) -> u64 {
        self.joined.load(Ordering::Relaxed)
    }

    fn spawn_flight<Fut>(&self, key: &str, tx: oneshot::Sender<Result<V, E>>, load: Fut)
    where
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let guard = FlightGuard {
            calls: Arc::clone(&self.calls),
            key: key.to_string(),
        };

        tokio::spawn(async move {
            let outcome = AssertUnwindSafe(load).catch_unwind().await;
            let key = guard.key.clone();
            // Clear the record before releasing waiters so that any call made
            // after a waiter wakes up starts a fresh load.
            drop(guard);
            match outcome {
                Ok(result) => {
                    let _ = tx.send(result);
                }
                Err(_) => warn!("In-flight load panicked: {}", key),
            }
        });
    }
}

impl<V, E> Default for SingleFlight<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<LoadAborted> + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

// Removes the flight record when the load task ends, including by panic or
// runtime shutdown, so a lost load never wedges its key.
struct FlightGuard<V, E> {
    calls: FlightMap<V, E>,
    key: String,
}

impl<V, E> Drop for FlightGuard<V, E> {
    fn drop(&mut self) {
        self.calls.lock().remove(&self.key);
    }
}
