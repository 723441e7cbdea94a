//! Request wrapper with timeout, failure classification and retries.
//!
//! Every backend call made on behalf of a view goes through
//! [`ApiCaller::call_brain`]. A call either resolves with the decoded
//! payload or rejects with a classified [`ApiError`]; callers never see a
//! raw transport error.

use std::future::Future;
use std::time::Duration;

use questboard_domain::{ApiError, BrainResponse, CallOptions};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::ports::{Notifier, TransportResult};

/// Suspends the current task for `duration`.
pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Message and structured details extracted from a non-ok response.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorInfo {
    /// Human-readable message.
    pub message: String,
    /// Parsed JSON body, when the response was JSON.
    pub details: Option<Value>,
}

/// Extracts an error message from a non-ok response. Never fails.
///
/// JSON bodies prefer their `detail`, then `message` field. Other bodies
/// are used verbatim. Empty or unparseable bodies fall back to
/// `HTTP <status> <statusText>`.
#[must_use]
pub fn extract_error_info(response: BrainResponse) -> ErrorInfo {
    let fallback = response.status_line();

    if response.is_json() {
        return match response.into_json::<Value>() {
            Ok(data) => {
                let message = message_field(&data, "detail")
                    .or_else(|| message_field(&data, "message"))
                    .unwrap_or(fallback);
                ErrorInfo {
                    message,
                    details: Some(data),
                }
            }
            Err(_) => ErrorInfo {
                message: fallback,
                details: None,
            },
        };
    }

    let text = response.into_text();
    ErrorInfo {
        message: if text.is_empty() { fallback } else { text },
        details: None,
    }
}

/// Reads `field` as a message. Null, `false` and empty strings count as absent.
fn message_field(data: &Value, field: &str) -> Option<String> {
    match data.get(field)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Classifies the outcome of one attempt.
async fn attempt_once<Fut>(call: Fut, timeout: Duration) -> Result<BrainResponse, ApiError>
where
    Fut: Future<Output = TransportResult>,
{
    // Losing the race drops `call`, which aborts the request.
    let response = match tokio::time::timeout(timeout, call).await {
        Err(_) => return Err(ApiError::timeout()),
        Ok(Err(transport)) => return Err(transport.into()),
        Ok(Ok(response)) => response,
    };

    if !response.is_ok() {
        let status = response.status;
        let url = response.url.clone();
        let info = extract_error_info(response);
        return Err(ApiError::from_response(
            status,
            url,
            info.message,
            info.details,
        ));
    }
    Ok(response)
}

/// Executes backend calls with bounded latency and bounded retries.
///
/// # Example
///
/// ```ignore
/// let caller = ApiCaller::new(TracingNotifier::new());
/// let competitions: Option<Vec<Competition>> = caller
///     .call_brain(|| brain.list_competitions(), &CallOptions::default())
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct ApiCaller<N: Notifier> {
    notifier: N,
}

impl<N: Notifier> ApiCaller<N> {
    /// Creates a caller that reports terminal failures to `notifier`.
    pub const fn new(notifier: N) -> Self {
        Self { notifier }
    }

    /// Returns the notifier.
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Runs `call` until it succeeds or fails terminally.
    ///
    /// Each attempt invokes `call` afresh and races it against
    /// `options.timeout`. Only `network` and `server` failures are
    /// retried, at most `options.retries` times, waiting
    /// `min(retry_delay * 2^attempt, 3s)` in between.
    ///
    /// Resolves with `None` when the server answers 2xx with a body that
    /// is empty or not the expected JSON.
    ///
    /// # Errors
    ///
    /// Returns the classified `ApiError` of the last attempt.
    pub async fn call_brain<T, F, Fut>(
        &self,
        call: F,
        options: &CallOptions,
    ) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
        F: FnMut() -> Fut,
        Fut: Future<Output = TransportResult>,
    {
        let response = self.send(call, options).await?;
        match response.into_json::<T>() {
            Ok(payload) => Ok(Some(payload)),
            Err(e) => {
                debug!(error = %e, "response body is not the expected JSON, resolving empty");
                Ok(None)
            }
        }
    }

    /// Same policy as [`call_brain`](Self::call_brain), returning the ok
    /// response undecoded.
    ///
    /// # Errors
    ///
    /// Returns the classified `ApiError` of the last attempt.
    pub async fn send<F, Fut>(
        &self,
        mut call: F,
        options: &CallOptions,
    ) -> Result<BrainResponse, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = TransportResult>,
    {
        let mut attempt: u32 = 0;
        loop {
            match attempt_once(call(), options.timeout).await {
                Ok(response) => return Ok(response),
                Err(err) => {
                    attempt += 1;
                    if attempt > options.retries || !err.is_retriable() {
                        warn!(
                            cause = ?err.cause,
                            status = ?err.status,
                            attempts = attempt,
                            "request failed: {}",
                            err.message
                        );
                        if options.show_toast_on_error {
                            self.notifier.notify_error(&err.notification_text());
                        }
                        return Err(err);
                    }

                    let delay = options.backoff_delay(attempt - 1);
                    debug!(
                        cause = ?err.cause,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "retrying request"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use questboard_domain::ApiErrorCause;
    use serde_json::json;
    use tokio::time::Instant;

    use super::*;
    use crate::ports::TransportError;

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify_error(&self, message: &str) {
            self.messages.lock().push(message.to_string());
        }
    }

    fn caller() -> ApiCaller<Arc<RecordingNotifier>> {
        ApiCaller::new(Arc::new(RecordingNotifier::default()))
    }

    /// Returns a call that yields `response` and counts invocations.
    fn counting(
        calls: &Arc<AtomicU32>,
        response: TransportResult,
    ) -> impl FnMut() -> std::future::Ready<TransportResult> {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(response.clone())
        }
    }

    #[test]
    fn test_extract_prefers_detail_then_message() {
        let res = BrainResponse::json(404, &json!({"detail": "Competition not found"}));
        assert_eq!(extract_error_info(res).message, "Competition not found");

        let res = BrainResponse::json(400, &json!({"message": "bad payload", "detail": null}));
        let info = extract_error_info(res);
        assert_eq!(info.message, "bad payload");
        assert_eq!(info.details, Some(json!({"message": "bad payload", "detail": null})));
    }

    #[test]
    fn test_extract_falls_back_to_status_line() {
        let res = BrainResponse::json(500, &json!({"error": true}))
            .with_status_text("Internal Server Error");
        assert_eq!(
            extract_error_info(res).message,
            "HTTP 500 Internal Server Error"
        );

        let res = BrainResponse::new(502, "<html")
            .with_header("content-type", "application/json")
            .with_status_text("Bad Gateway");
        let info = extract_error_info(res);
        assert_eq!(info.message, "HTTP 502 Bad Gateway");
        assert_eq!(info.details, None);
    }

    #[test]
    fn test_extract_uses_text_body() {
        let res = BrainResponse::new(403, "forbidden zone").with_header("content-type", "text/plain");
        assert_eq!(extract_error_info(res).message, "forbidden zone");

        let res = BrainResponse::new(418, "").with_status_text("I'm a teapot");
        assert_eq!(extract_error_info(res).message, "HTTP 418 I'm a teapot");
    }

    #[test]
    fn test_extract_stringifies_structured_detail() {
        let res = BrainResponse::json(422, &json!({"detail": [{"loc": ["body"], "msg": "field required"}]}));
        let info = extract_error_info(res);
        assert!(info.message.contains("field required"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_returns_payload() {
        let calls = Arc::new(AtomicU32::new(0));
        let value: Option<Value> = caller()
            .call_brain(
                counting(&calls, Ok(BrainResponse::json(200, &json!({"ok": true})))),
                &CallOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(value, Some(json!({"ok": true})));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_success_body_resolves_none() {
        let calls = Arc::new(AtomicU32::new(0));
        let value: Option<Value> = caller()
            .call_brain(
                counting(&calls, Ok(BrainResponse::new(204, ""))),
                &CallOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_errors_retry_up_to_limit() {
        let calls = Arc::new(AtomicU32::new(0));
        let options = CallOptions::default().with_retries(3);
        let started = Instant::now();

        let err = caller()
            .call_brain::<Value, _, _>(
                counting(
                    &calls,
                    Ok(BrainResponse::new(503, "").with_status_text("Service Unavailable")),
                ),
                &options,
            )
            .await
            .unwrap_err();

        assert_eq!(err.cause, ApiErrorCause::Server);
        assert_eq!(err.status, Some(503));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // 800 + 1600 + 3000 (capped)
        assert_eq!(started.elapsed(), Duration::from_millis(5400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_errors_never_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let options = CallOptions::default().with_retries(5);

        let err = caller()
            .call_brain::<Value, _, _>(
                counting(&calls, Ok(BrainResponse::json(404, &json!({"detail": "nope"})))),
                &options,
            )
            .await
            .unwrap_err();

        assert_eq!(err.cause, ApiErrorCause::Client);
        assert_eq!(err.message, "nope");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_error_retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let value: Option<Value> = caller()
            .call_brain(
                move || {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    std::future::ready(if n == 0 {
                        Err(TransportError::ConnectionFailed("reset".to_string()))
                    } else {
                        Ok(BrainResponse::json(200, &json!([1, 2])))
                    })
                },
                &CallOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(value, Some(json!([1, 2])));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_rejects_before_call_settles() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let options = CallOptions::default()
            .with_timeout(Duration::from_millis(100))
            .with_retries(3);
        let started = Instant::now();

        let err = caller()
            .call_brain::<Value, _, _>(
                move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async {
                        tokio::time::sleep(Duration::from_secs(10)).await;
                        Ok::<_, TransportError>(BrainResponse::new(200, "{}"))
                    }
                },
                &options,
            )
            .await
            .unwrap_err();

        assert_eq!(err.cause, ApiErrorCause::Timeout);
        assert_eq!(started.elapsed(), Duration::from_millis(100));
        // Timeouts are terminal for the wrapper.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toast_on_terminal_failure_only_when_enabled() {
        let quiet = caller();
        let _ = quiet
            .call_brain::<Value, _, _>(
                || std::future::ready(Ok(BrainResponse::new(400, "bad"))),
                &CallOptions::default(),
            )
            .await;
        assert!(quiet.notifier().messages.lock().is_empty());

        let loud = caller();
        let _ = loud
            .call_brain::<Value, _, _>(
                || std::future::ready(Ok(BrainResponse::new(400, "bad"))),
                &CallOptions::default().with_toast_on_error(true),
            )
            .await;
        assert_eq!(
            *loud.notifier().messages.lock(),
            vec!["Request failed (HTTP 400): bad".to_string()]
        );
    }
}
