//! Notification channel that writes to the log.

use questboard_application::ports::Notifier;
use tracing::warn;

/// Reports user-facing failures as `warn` events on the `questboard::notify`
/// target.
///
/// Headless hosts (the CLI, background jobs) use this in place of a toast.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    /// Creates a new notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Notifier for TracingNotifier {
    fn notify_error(&self, message: &str) {
        warn!(target: "questboard::notify", "{message}");
    }
}
