//! Deduplication of concurrent calls sharing a key.
//!
//! While a call registered under a key is pending, every caller asking for
//! that key receives a handle to the same underlying future and observes
//! the same outcome. The key is released the moment the call settles, so
//! this deduplicates concurrency only and never caches results.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared, WeakShared};
use parking_lot::Mutex;
use questboard_domain::ApiError;
use tracing::debug;

/// A pending call shared by every caller of the same key.
pub type Flight<T, E = ApiError> = Shared<BoxFuture<'static, Result<T, E>>>;

type Registry<T, E> = Arc<Mutex<HashMap<String, Entry<T, E>>>>;

struct Entry<T, E> {
    id: u64,
    flight: WeakShared<BoxFuture<'static, Result<T, E>>>,
}

/// Removes its registry entry when the wrapped call settles or is dropped.
struct Release<T, E> {
    registry: Registry<T, E>,
    key: String,
    id: u64,
}

impl<T, E> Drop for Release<T, E> {
    fn drop(&mut self) {
        let mut in_flight = self.registry.lock();
        if in_flight.get(&self.key).is_some_and(|e| e.id == self.id) {
            in_flight.remove(&self.key);
        }
    }
}

/// Registry of in-flight calls for one result type.
///
/// Cloning yields a handle to the same registry.
pub struct SingleFlight<T, E = ApiError> {
    in_flight: Registry<T, E>,
    next_id: Arc<AtomicU64>,
}

impl<T, E> Clone for SingleFlight<T, E> {
    fn clone(&self) -> Self {
        Self {
            in_flight: Arc::clone(&self.in_flight),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<T, E> Default for SingleFlight<T, E> {
    fn default() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl<T, E> SingleFlight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the pending call for `key`, starting `call` if there is none.
    ///
    /// `call` is invoked only when no call for `key` is pending. The
    /// registration is removed as soon as the call settles, whether it
    /// succeeded or failed, or when every handle to it has been dropped.
    pub fn run<F, Fut>(&self, key: &str, call: F) -> Flight<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        if let Some(flight) = self.pending(key) {
            debug!(key, "reusing in-flight request");
            return flight;
        }

        // Futures are lazy, so building one outside the lock is free; it is
        // discarded unpolled if another caller registered the key meanwhile.
        let fut = call();

        let mut in_flight = self.in_flight.lock();
        if let Some(flight) = in_flight.get(key).and_then(|e| e.flight.upgrade()) {
            debug!(key, "reusing in-flight request");
            return flight;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let release = Release {
            registry: Arc::clone(&self.in_flight),
            key: key.to_string(),
            id,
        };
        let flight = async move {
            let _release = release;
            fut.await
        }
        .boxed()
        .shared();

        if let Some(weak) = flight.downgrade() {
            in_flight.insert(key.to_string(), Entry { id, flight: weak });
        }
        flight
    }

    /// Returns the pending call for `key`, if any.
    #[must_use]
    pub fn pending(&self, key: &str) -> Option<Flight<T, E>> {
        self.in_flight
            .lock()
            .get(key)
            .and_then(|entry| entry.flight.upgrade())
    }

    /// Returns true if a call for `key` is pending.
    #[must_use]
    pub fn is_pending(&self, key: &str) -> bool {
        self.pending(key).is_some()
    }

    /// Number of pending keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
