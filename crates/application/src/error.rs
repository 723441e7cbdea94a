//! Application error types

use questboard_domain::ApiError;
use thiserror::Error;

/// Application-level errors.
#[derive(Debug, Clone, Error)]
pub enum ApplicationError {
    /// An API call failed terminally.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// A payload could not be decoded into the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ApplicationError {
    /// Creates a `Decode` error naming what was being decoded.
    pub fn decode(what: &str, err: impl std::fmt::Display) -> Self {
        Self::Decode(format!("{what}: {err}"))
    }

    /// Returns the API error, if this is one.
    #[must_use]
    pub const fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            Self::Decode(_) => None,
        }
    }
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
