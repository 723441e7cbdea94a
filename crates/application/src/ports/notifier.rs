//! User notification port

use std::sync::Arc;

/// Port for user-visible notifications (toasts).
pub trait Notifier: Send + Sync {
    /// Surfaces an error message to the user.
    fn notify_error(&self, message: &str);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify_error(&self, message: &str) {
        (**self).notify_error(message);
    }
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify_error(&self, message: &str) {
        (**self).notify_error(message);
    }
}
