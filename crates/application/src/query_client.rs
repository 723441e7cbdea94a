//! Process-wide query cache applying the default fetch policy.
//!
//! Views fetch data through [`QueryClient::fetch_query`] with a key from
//! [`QueryKey`]. Fresh entries are served from memory; stale or missing
//! entries are fetched once (concurrent readers share the request),
//! retried per [`QueryPolicy`] and stored.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use questboard_domain::{ApiError, ApiErrorCause, QueryKey, QueryPolicy};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use crate::call::sleep;
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::PageVisibility;
use crate::single_flight::SingleFlight;

const MAX_CACHED_QUERIES: u64 = 10_000;

/// Polling interval for a live view.
///
/// Returns `base` while the page is visible and `None` (polling disabled)
/// while it is hidden, so background tabs do not poll.
pub fn polling_interval(base: Duration, visibility: &impl PageVisibility) -> Option<Duration> {
    visibility.is_visible().then_some(base)
}

#[derive(Debug, Clone)]
struct CachedQuery {
    data: Value,
    fetched_at: Instant,
    /// Staleness epoch the data was fetched in.
    epoch: u64,
}

/// Query cache shared by every view of the dashboard.
#[derive(Clone)]
pub struct QueryClient {
    policy: QueryPolicy,
    cache: Cache<QueryKey, CachedQuery>,
    flights: SingleFlight<Value>,
    /// Bumped to mark every entry stale without dropping its data.
    epoch: Arc<AtomicU64>,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(QueryPolicy::default())
    }
}

impl QueryClient {
    /// Creates a client with the given policy.
    ///
    /// Entries nobody reads for `policy.gc_time` are evicted.
    #[must_use]
    pub fn new(policy: QueryPolicy) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_CACHED_QUERIES)
            .time_to_idle(policy.gc_time)
            .build();
        Self {
            policy,
            cache,
            flights: SingleFlight::new(),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns the policy in effect.
    #[must_use]
    pub const fn policy(&self) -> &QueryPolicy {
        &self.policy
    }

    /// Returns the data for `key`, fetching it if missing or stale.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Api` with the last fetch error once the
    /// retry policy gives up, or `ApplicationError::Decode` if the data does
    /// not have the requested shape.
    pub async fn fetch_query<T, F, Fut>(&self, key: &QueryKey, fetcher: F) -> ApplicationResult<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        if let Some(entry) = self.cache.get(key).await
            && self.is_fresh(&entry)
        {
            debug!(%key, "serving fresh query from cache");
            return decode(key, entry.data);
        }

        let policy = self.policy;
        let cache = self.cache.clone();
        let cache_key = key.clone();
        let epoch = Arc::clone(&self.epoch);
        let flight = self.flights.run(&key.cache_key(), move || async move {
            let started_in = epoch.load(Ordering::SeqCst);
            let data = fetch_with_retry(&policy, &cache_key, fetcher).await?;
            let data = serde_json::to_value(data).map_err(|e| {
                ApiError::new(format!("query data is not serializable: {e}"), ApiErrorCause::Unknown)
            })?;
            cache
                .insert(
                    cache_key,
                    CachedQuery {
                        data: data.clone(),
                        fetched_at: Instant::now(),
                        epoch: started_in,
                    },
                )
                .await;
            Ok(data)
        });

        let data = flight.await?;
        decode(key, data)
    }

    /// Returns cached data for `key` without fetching, fresh or not.
    pub async fn get_query_data<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entry = self.cache.get(key).await?;
        serde_json::from_value(entry.data).ok()
    }

    /// Stores data for `key` as if it had just been fetched.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Decode` if `data` cannot be serialized.
    pub async fn set_query_data<T: Serialize>(&self, key: &QueryKey, data: &T) -> ApplicationResult<()> {
        let data = serde_json::to_value(data).map_err(|e| ApplicationError::decode("query data", e))?;
        self.cache
            .insert(
                key.clone(),
                CachedQuery {
                    data,
                    fetched_at: Instant::now(),
                    epoch: self.epoch.load(Ordering::SeqCst),
                },
            )
            .await;
        Ok(())
    }

    /// Drops the entry for `key` so the next read refetches it.
    pub async fn invalidate(&self, key: &QueryKey) {
        self.cache.invalidate(key).await;
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Handles the window regaining focus.
    ///
    /// Cached data stays readable; the next fetch of each key refetches.
    /// Returns true if entries were marked stale.
    pub fn on_window_focus(&self) -> bool {
        if self.policy.refetch_on_window_focus {
            debug!("window focused, marking queries stale");
            self.mark_all_stale();
        }
        self.policy.refetch_on_window_focus
    }

    /// Handles connectivity returning.
    ///
    /// Returns true if entries were marked stale.
    pub fn on_reconnect(&self) -> bool {
        if self.policy.refetch_on_reconnect {
            debug!("reconnected, marking queries stale");
            self.mark_all_stale();
        }
        self.policy.refetch_on_reconnect
    }

    fn mark_all_stale(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    fn is_fresh(&self, entry: &CachedQuery) -> bool {
        entry.epoch == self.epoch.load(Ordering::SeqCst)
            && entry.fetched_at.elapsed() < self.policy.stale_time
    }
}

/// Runs `fetcher` until it succeeds or the retry policy gives up.
async fn fetch_with_retry<T, F, Fut>(
    policy: &QueryPolicy,
    key: &QueryKey,
    fetcher: F,
) -> Result<T, ApiError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut failure_count: u32 = 0;
    loop {
        match fetcher().await {
            Ok(data) => return Ok(data),
            Err(err) => {
                if !policy.should_retry(failure_count, &err) {
                    return Err(err);
                }
                let delay = policy.retry_delay(failure_count);
                debug!(%key, failure_count, ?delay, "retrying query");
                sleep(delay).await;
                failure_count += 1;
            }
        }
    }
}

fn decode<T: DeserializeOwned>(key: &QueryKey, data: Value) -> ApplicationResult<T> {
    serde_json::from_value(data).map_err(|e| ApplicationError::decode(&key.cache_key(), e))
}
