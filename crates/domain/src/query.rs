//! Query cache identity and default fetch policy.
//!
//! Data-fetching call sites never build cache keys by hand: they take
//! them from the constructors on [`QueryKey`], so two views asking for the
//! same resource always share one cache entry.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api_error::ApiError;
use crate::error::{DomainError, DomainResult};

/// Semantic cache key of a query, e.g. `["leaderboard", "week"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    /// Builds a key from raw segments.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidQueryKey` if there are no segments or
    /// any segment is empty.
    pub fn new<I, S>(segments: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(DomainError::InvalidQueryKey("no segments".to_string()));
        }
        if segments.iter().any(String::is_empty) {
            return Err(DomainError::InvalidQueryKey(format!(
                "empty segment in {segments:?}"
            )));
        }
        Ok(Self(segments))
    }

    fn fixed(segments: &[&str]) -> Self {
        Self(segments.iter().map(|s| (*s).to_string()).collect())
    }

    /// Bonus challenges.
    #[must_use]
    pub fn challenges() -> Self {
        Self::fixed(&["challenges"])
    }

    /// Team statistics.
    #[must_use]
    pub fn team_stats() -> Self {
        Self::fixed(&["teamStats"])
    }

    /// Player progress for a view mode.
    #[must_use]
    pub fn player_progress(view_mode: &str) -> Self {
        Self::fixed(&["playerProgress", view_mode])
    }

    /// Leaderboard for a period.
    #[must_use]
    pub fn leaderboard(period: &str) -> Self {
        Self::fixed(&["leaderboard", period])
    }

    /// Activity history.
    #[must_use]
    pub fn activity_history() -> Self {
        Self::fixed(&["activityHistory"])
    }

    /// Returns the key segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Flat string form, usable as a single-flight key.
    #[must_use]
    pub fn cache_key(&self) -> String {
        serde_json::Value::from(self.0.clone()).to_string()
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}

/// Default caching, retry and refetch policy for queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    /// Entries younger than this are served without a network call.
    pub stale_time: Duration,
    /// Entries nobody reads are evicted after this long.
    pub gc_time: Duration,
    /// Retries after the first failure for non-4xx errors.
    pub max_retries: u32,
    /// Base unit of the retry backoff.
    pub retry_base_delay: Duration,
    /// Cap of the retry backoff.
    pub max_retry_delay: Duration,
    /// Mark entries stale when the window regains focus.
    pub refetch_on_window_focus: bool,
    /// Mark entries stale when connectivity returns.
    pub refetch_on_reconnect: bool,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(30),
            gc_time: Duration::from_secs(5 * 60),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(1000),
            max_retry_delay: Duration::from_millis(30_000),
            refetch_on_window_focus: true,
            refetch_on_reconnect: false,
        }
    }
}

impl QueryPolicy {
    /// Whether a query that has failed `failure_count` times before this
    /// failure should be retried.
    ///
    /// Errors with a status in `[400, 500)` are never retried.
    #[must_use]
    pub fn should_retry(&self, failure_count: u32, error: &ApiError) -> bool {
        if error.is_client_status() {
            return false;
        }
        failure_count < self.max_retries
    }

    /// Delay before retry `attempt_index` (zero-based).
    ///
    /// `min(1000ms * 2^attempt_index, 30s)` with the default policy.
    #[must_use]
    pub fn retry_delay(&self, attempt_index: u32) -> Duration {
        2u32.checked_pow(attempt_index)
            .map_or(self.max_retry_delay, |factor| {
                self.retry_base_delay.saturating_mul(factor)
            })
            .min(self.max_retry_delay)
    }
}
