//! Page visibility flag shared between the host and pollers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use questboard_application::ports::PageVisibility;

/// Visibility flag the host flips when the page is shown or hidden.
///
/// Clones share the same flag. Starts visible.
#[derive(Debug, Clone)]
pub struct SharedVisibility {
    visible: Arc<AtomicBool>,
}

impl Default for SharedVisibility {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SharedVisibility {
    /// Creates a flag with the given initial state.
    #[must_use]
    pub fn new(visible: bool) -> Self {
        Self {
            visible: Arc::new(AtomicBool::new(visible)),
        }
    }

    /// Records whether the page is visible.
    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Release);
    }
}

impl PageVisibility for SharedVisibility {
    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use questboard_application::polling_interval;

    use super::*;

    #[test]
    fn test_hidden_page_disables_polling() {
        let visibility = SharedVisibility::default();
        let host = visibility.clone();
        let base = Duration::from_millis(600_000);

        assert_eq!(polling_interval(base, &visibility), Some(base));
        host.set_visible(false);
        assert_eq!(polling_interval(base, &visibility), None);
        host.set_visible(true);
        assert_eq!(polling_interval(base, &visibility), Some(base));
    }
}
