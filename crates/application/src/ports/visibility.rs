//! Page visibility port

/// Port for whether the dashboard is currently shown to the user.
pub trait PageVisibility: Send + Sync {
    /// Returns true if the page is visible.
    fn is_visible(&self) -> bool;
}

/// Visibility source for hosts without a page (CLI, tests): always visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysVisible;

impl PageVisibility for AlwaysVisible {
    fn is_visible(&self) -> bool {
        true
    }
}
