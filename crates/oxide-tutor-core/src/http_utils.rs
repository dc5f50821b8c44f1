//! HTTP utilities shared by the outbound API clients
//!
//! Client construction with a bounded timeout, error-body cleanup, and the
//! single transient-failure retry applied to every outbound call.

use crate::config::{
    OUTBOUND_INITIAL_BACKOFF_MS, OUTBOUND_MAX_BACKOFF_MS, OUTBOUND_MAX_RETRIES,
};
use crate::utils::truncate_str;
use reqwest::Client as HttpClient;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::warn;

/// Longest error body kept in an error message
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Creates an HTTP client with the given request timeout.
pub fn create_http_client(timeout_secs: u64) -> HttpClient {
    HttpClient::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| HttpClient::new())
}

/// Turns a non-success response body into something fit for a chat message.
pub fn clean_error_body(body: &str) -> String {
    let trimmed = body.trim_start();

    // Nginx/proxy error pages
    let is_html = trimmed.starts_with("<!DOCTYPE")
        || trimmed.starts_with("<html")
        || trimmed.starts_with("<HTML");

    if is_html {
        return "server returned an HTML error page".to_string();
    }

    if body.chars().count() > MAX_ERROR_BODY_CHARS {
        format!("{}... (truncated)", truncate_str(body, MAX_ERROR_BODY_CHARS))
    } else {
        body.to_string()
    }
}

/// Whether an HTTP status is worth one more attempt.
pub const fn is_transient_status(status: u16) -> bool {
    status == 429 || status >= 500
}

/// Runs `operation`, retrying once with jittered backoff when `is_transient`
/// accepts the error.
pub async fn retry_transient<A, Fut, T, E>(
    label: &str,
    operation: A,
    is_transient: fn(&E) -> bool,
) -> Result<T, E>
where
    A: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let strategy = ExponentialBackoff::from_millis(OUTBOUND_INITIAL_BACKOFF_MS)
        .max_delay(Duration::from_millis(OUTBOUND_MAX_BACKOFF_MS))
        .map(jitter)
        .take(OUTBOUND_MAX_RETRIES);

    RetryIf::start(strategy, operation, |e: &E| {
        let retry = is_transient(e);
        if retry {
            warn!(target_api = label, error = %e, "Transient failure, retrying once");
        }
        retry
    })
    .await
}
