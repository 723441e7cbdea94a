//! Options for a single wrapped API call.

use std::time::Duration;

/// Upper bound on the delay between two attempts of one call.
pub const MAX_CALL_BACKOFF: Duration = Duration::from_millis(3000);

/// Configuration for one wrapped API call.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use questboard_domain::CallOptions;
///
/// let options = CallOptions::default()
///     .with_retries(3)
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(options.retries, 3);
/// assert_eq!(options.retry_delay, Duration::from_millis(800));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOptions {
    /// Maximum wait for one attempt before it fails with cause `timeout`.
    pub timeout: Duration,
    /// Additional attempts allowed for `network` and `server` failures.
    pub retries: u32,
    /// Base unit of the exponential backoff.
    pub retry_delay: Duration,
    /// Whether a terminal failure is surfaced as a user notification.
    pub show_toast_on_error: bool,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(12_000),
            retries: 1,
            retry_delay: Duration::from_millis(800),
            show_toast_on_error: false,
        }
    }
}

impl CallOptions {
    /// Creates options with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the number of retries.
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the backoff base unit.
    #[must_use]
    pub const fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Enables or disables the failure notification.
    #[must_use]
    pub const fn with_toast_on_error(mut self, show: bool) -> Self {
        self.show_toast_on_error = show;
        self
    }

    /// Delay before retry number `attempt` (zero-based).
    ///
    /// `min(retry_delay * 2^attempt, 3s)`.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .map_or(MAX_CALL_BACKOFF, |factor| {
                self.retry_delay.saturating_mul(factor)
            })
            .min(MAX_CALL_BACKOFF)
    }
}
