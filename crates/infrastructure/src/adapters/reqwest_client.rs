//! Backend client implementation using reqwest.
//!
//! This adapter implements the `BrainClient` port against the QuestBoard
//! backend's HTTP routes.

use std::future::Future;
use std::time::Duration;

use questboard_application::ports::{BrainClient, TransportError, TransportResult};
use questboard_domain::{BrainResponse, ClientSettings};
use reqwest::Client;
use tracing::debug;
use url::Url;

const MAX_REDIRECTS: usize = 10;

/// v1 competition listing.
pub const LIST_COMPETITIONS_PATH: &str = "routes/booking-competition";
/// v2 competition listing.
pub const LIST_COMPETITIONS_V2_PATH: &str = "routes/competitions-v2/list";
/// v1 leaderboard, followed by `/{competition_id}`.
pub const LEADERBOARD_PATH: &str = "routes/booking-competition/leaderboard";

/// Backend client implementation using reqwest.
///
/// Dropping a pending call aborts the underlying HTTP request.
#[derive(Debug, Clone)]
pub struct ReqwestBrainClient {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
    timeout: Duration,
}

impl ReqwestBrainClient {
    /// Creates a client for the backend at `base_url`.
    ///
    /// Default configuration:
    /// - Request timeout: 12 seconds
    /// - Follow redirects: up to 10
    /// - User-Agent: "QuestBoard/0.1.0"
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL or the client
    /// cannot be created.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent("QuestBoard/0.1.0")
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self::with_client(client, parse_base_url(base_url)?))
    }

    /// Creates a client configured from `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, TransportError> {
        let mut client = Self::new(&settings.api_base_url)?
            .with_timeout(Duration::from_millis(settings.timeout_ms));
        if let Some(token) = &settings.auth_token {
            client = client.with_auth_token(token);
        }
        Ok(client)
    }

    /// Creates a client with a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, base_url: Url) -> Self {
        Self {
            client,
            base_url,
            auth_token: None,
            timeout: Duration::from_millis(12_000),
        }
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    ///
    /// A blank token disables the header.
    #[must_use]
    pub fn with_auth_token(mut self, token: &str) -> Self {
        let token = token.trim();
        self.auth_token = (!token.is_empty()).then(|| token.to_string());
        self
    }

    /// Sets the transport-level timeout for each request.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the backend base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|e| TransportError::InvalidUrl(format!("{e}: {path}")))
    }

    /// Sends `GET` for `path`, relative to the base URL.
    ///
    /// # Errors
    ///
    /// Returns a `TransportError` if no response was received.
    pub async fn get_path(&self, path: &str) -> TransportResult {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");

        let mut builder = self.client.get(url).timeout(self.timeout);
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }

        let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(e, timeout_ms))?;

        let status = response.status();
        let mut brain_response = BrainResponse::new(status.as_u16(), Vec::new())
            .with_status_text(status.canonical_reason().unwrap_or_default())
            .with_url(response.url().as_str());
        for (name, value) in response.headers() {
            brain_response =
                brain_response.with_header(name.as_str(), value.to_str().unwrap_or("<binary>"));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_error(e, timeout_ms))?;
        brain_response.body = body.to_vec();
        Ok(brain_response)
    }

    /// Maps reqwest errors to port-level `TransportError`.
    fn map_error(error: reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }

        let host = || {
            error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string()
        };

        if error.is_connect() {
            let message = error.to_string();
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return TransportError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lower.contains("refused") {
                return TransportError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return TransportError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return TransportError::TooManyRedirects { max: MAX_REDIRECTS };
        }

        TransportError::Other(error.to_string())
    }
}

/// Parses the base URL so relative endpoint paths join under it.
fn parse_base_url(base_url: &str) -> Result<Url, TransportError> {
    let mut url =
        Url::parse(base_url).map_err(|e| TransportError::InvalidUrl(format!("{e}: {base_url}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

impl BrainClient for ReqwestBrainClient {
    fn list_competitions(&self) -> impl Future<Output = TransportResult> + Send {
        self.get_path(LIST_COMPETITIONS_PATH)
    }

    fn list_competitions_v2(&self) -> impl Future<Output = TransportResult> + Send {
        self.get_path(LIST_COMPETITIONS_V2_PATH)
    }

    fn leaderboard(&self, competition_id: i64) -> impl Future<Output = TransportResult> + Send {
        let path = format!("{LEADERBOARD_PATH}/{competition_id}");
        async move { self.get_path(&path).await }
    }
}
