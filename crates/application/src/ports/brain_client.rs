//! Backend API port

use std::future::Future;
use std::sync::Arc;

use questboard_domain::{ApiError, ApiErrorCause, BrainResponse};
use thiserror::Error;

/// Failure before any HTTP response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport gave up waiting.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout that elapsed.
        timeout_ms: u64,
    },

    /// Host name could not be resolved.
    #[error("DNS resolution failed for {host}: {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Underlying error message.
        message: String,
    },

    /// The server refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The connection could not be established or broke.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Redirect limit exceeded.
    #[error("too many redirects (max {max})")]
    TooManyRedirects {
        /// Redirect limit.
        max: usize,
    },

    /// Endpoint URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Returns true if the transport itself timed out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        if err.is_timeout() {
            Self::new("Request timed out", ApiErrorCause::Timeout)
        } else {
            Self::network(err.to_string())
        }
    }
}

/// Result of one raw backend call.
pub type TransportResult = Result<BrainResponse, TransportError>;

/// Port for the backend API.
///
/// One method per endpoint the client core depends on. Implementations
/// return the raw response; status handling belongs to the caller.
pub trait BrainClient: Send + Sync {
    /// Lists v1 booking competitions.
    fn list_competitions(&self) -> impl Future<Output = TransportResult> + Send;

    /// Lists competitions 2.0.
    fn list_competitions_v2(&self) -> impl Future<Output = TransportResult> + Send;

    /// Fetches the leaderboard of a v1 competition.
    fn leaderboard(&self, competition_id: i64) -> impl Future<Output = TransportResult> + Send;
}

impl<B: BrainClient> BrainClient for Arc<B> {
    fn list_competitions(&self) -> impl Future<Output = TransportResult> + Send {
        (**self).list_competitions()
    }

    fn list_competitions_v2(&self) -> impl Future<Output = TransportResult> + Send {
        (**self).list_competitions_v2()
    }

    fn leaderboard(&self, competition_id: i64) -> impl Future<Output = TransportResult> + Send {
        (**self).leaderboard(competition_id)
    }
}
