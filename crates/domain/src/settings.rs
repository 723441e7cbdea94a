//! Client Settings Domain Model
//!
//! Defines how the QuestBoard client reaches the backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::call_options::CallOptions;
use crate::error::{DomainError, DomainResult};

/// Settings for the client core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Base URL of the backend API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Bearer token sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Per-attempt timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries for network and server failures.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Backoff base unit in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Whether terminal request failures notify the user.
    #[serde(default)]
    pub show_toast_on_error: bool,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

const fn default_timeout_ms() -> u64 {
    12_000
}

const fn default_retries() -> u32 {
    1
}

const fn default_retry_delay_ms() -> u64 {
    800
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            auth_token: None,
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            show_toast_on_error: false,
        }
    }
}

impl ClientSettings {
    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` naming the first invalid setting.
    pub fn validate(&self) -> DomainResult<()> {
        let base = self.api_base_url.trim();
        if base.is_empty() {
            return Err(DomainError::InvalidUrl("API base URL is required".to_string()));
        }
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(DomainError::InvalidUrl(format!(
                "URL must start with http:// or https://: {base}"
            )));
        }
        if self.timeout_ms == 0 {
            return Err(DomainError::invalid_setting("timeout_ms", "must be positive"));
        }
        Ok(())
    }

    /// Call options derived from these settings.
    #[must_use]
    pub const fn call_options(&self) -> CallOptions {
        CallOptions {
            timeout: Duration::from_millis(self.timeout_ms),
            retries: self.retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            show_toast_on_error: self.show_toast_on_error,
        }
    }
}
