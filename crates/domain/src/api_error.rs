//! Typed API errors produced by the request wrapper.
//!
//! Every terminal request failure is normalized into an [`ApiError`]
//! whose [`ApiErrorCause`] decides whether the failure may be retried.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cause category of a failed API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCause {
    /// The call never reached the server or did not complete normally.
    Network,
    /// The call exceeded its allotted wait.
    Timeout,
    /// The server answered with a 5xx status.
    Server,
    /// The server answered with a non-ok status below 500.
    Client,
    /// Unclassified failure.
    #[default]
    Unknown,
}

impl ApiErrorCause {
    /// Returns true if the request wrapper may retry a failure of this cause.
    ///
    /// Only `Network` and `Server` failures are retried; a `Timeout` is
    /// terminal for the wrapper itself.
    #[must_use]
    pub const fn is_retriable(self) -> bool {
        matches!(self, Self::Network | Self::Server)
    }

    /// Classifies a non-ok HTTP status.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        if status >= 500 {
            Self::Server
        } else {
            Self::Client
        }
    }
}

/// A classified API failure.
///
/// Constructed at the failure site inside the request wrapper and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiError {
    /// Human-readable message.
    pub message: String,
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
    /// URL the failing response came from.
    pub url: Option<String>,
    /// Cause category.
    pub cause: ApiErrorCause,
    /// Structured body of a JSON error response.
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Creates an error with the given message and cause and no HTTP context.
    pub fn new(message: impl Into<String>, cause: ApiErrorCause) -> Self {
        Self {
            message: message.into(),
            status: None,
            url: None,
            cause,
            details: None,
        }
    }

    /// Creates the error used when a call loses its timeout race.
    #[must_use]
    pub fn timeout() -> Self {
        Self::new("Request timed out", ApiErrorCause::Timeout)
    }

    /// Creates a `Network` error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(message, ApiErrorCause::Network)
    }

    /// Creates an error for a non-ok HTTP response.
    ///
    /// The cause is `Server` for status >= 500 and `Client` otherwise.
    pub fn from_response(
        status: u16,
        url: Option<String>,
        message: impl Into<String>,
        details: Option<serde_json::Value>,
    ) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
            url,
            cause: ApiErrorCause::from_status(status),
            details,
        }
    }

    /// Returns true if the request wrapper may retry this error.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        self.cause.is_retriable()
    }

    /// Returns true if the status is in `[400, 500)`.
    #[must_use]
    pub fn is_client_status(&self) -> bool {
        self.status.is_some_and(|s| (400..500).contains(&s))
    }

    /// Text shown in the user notification on terminal failure.
    #[must_use]
    pub fn notification_text(&self) -> String {
        let status_label = self
            .status
            .map(|s| format!(" (HTTP {s})"))
            .unwrap_or_default();
        let message = if self.message.is_empty() {
            "Unknown error"
        } else {
            &self.message
        };
        format!("Request failed{status_label}: {message}")
    }
}
