//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A client setting is out of range or malformed.
    #[error("invalid setting `{name}`: {reason}")]
    InvalidSetting {
        /// Setting name as it appears in the settings file.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The provided base URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A query key has no segments or an empty segment.
    #[error("invalid query key: {0}")]
    InvalidQueryKey(String),
}

impl DomainError {
    /// Creates an `InvalidSetting` error.
    pub fn invalid_setting(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            name,
            reason: reason.into(),
        }
    }
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
