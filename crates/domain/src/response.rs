//! HTTP response as seen by the client core.

use std::collections::HashMap;

use serde::de::DeserializeOwned;

/// An HTTP response returned by the backend API.
///
/// Body accessors take `self` by value, so a body is consumed at most once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BrainResponse {
    /// HTTP status code
    pub status: u16,
    /// Status text (e.g., "OK", "Not Found")
    pub status_text: String,
    /// Final URL of the response, if known
    pub url: Option<String>,
    /// Response headers, names lowercased
    pub headers: HashMap<String, String>,
    /// Raw response body
    pub body: Vec<u8>,
}

impl BrainResponse {
    /// Creates a response with the given status and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            ..Default::default()
        }
    }

    /// Creates a response with a JSON body and matching content type.
    #[must_use]
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string()).with_header("Content-Type", "application/json")
    }

    /// Adds a header. The name is stored lowercased.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Sets the status text.
    #[must_use]
    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    /// Sets the response URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns the `Content-Type` header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }

    /// Returns true if the content type is `application/json`.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.content_type().is_some_and(|ct| {
            ct.parse::<mime::Mime>().map_or_else(
                |_| ct.contains("application/json"),
                |m| m.essence_str() == mime::APPLICATION_JSON.essence_str(),
            )
        })
    }

    /// `HTTP <status> <statusText>`, used when the body says nothing useful.
    #[must_use]
    pub fn status_line(&self) -> String {
        format!("HTTP {} {}", self.status, self.status_text)
    }

    /// Consumes the response and parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is empty or not valid JSON for `T`.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Consumes the response and returns the body as text.
    ///
    /// Invalid UTF-8 sequences are replaced.
    #[must_use]
    pub fn into_text(self) -> String {
        String::from_utf8(self.body)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
    }
}
