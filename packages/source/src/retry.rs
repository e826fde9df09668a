//! HTTP retry helper for transient feed errors.
//!
//! The feed fetch goes through [`send_text`] rather than calling
//! `reqwest::RequestBuilder::send()` directly so that timeouts, dropped
//! connections, HTTP 429, and 5xx responses are retried with exponential
//! backoff. Other 4xx responses are permanent and fail immediately.
//!
//! ```ignore
//! let csv = retry::send_text(|| client.get(&url)).await?;
//! ```

use std::time::Duration;

use crate::SourceError;

/// Retries after the first attempt. Backoff is 2s, 4s, 8s, so a request
/// that never succeeds gives up after 14 seconds of waiting plus the
/// per-request timeouts.
const MAX_RETRIES: u32 = 3;

/// Full re-fetches allowed when the response arrives but its body cannot
/// be read.
const MAX_BODY_RETRIES: u32 = 2;

/// Sends a request and returns the response body as text.
///
/// `build_request` is called once per attempt since a
/// [`reqwest::RequestBuilder`] is consumed by `send()`.
///
/// # Errors
///
/// Returns [`SourceError`] if the request still fails after all retries,
/// the server answers with a permanent error status, or the body cannot be
/// read.
#[allow(clippy::future_not_send)]
pub async fn send_text<F>(build_request: F) -> Result<String, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut body_attempt = 0;

    loop {
        let response = send_inner(&build_request, MAX_RETRIES).await?;
        let status = response.status();
        let content_length = response.content_length();

        match response.text().await {
            Ok(text) => return Ok(text),
            Err(e) if body_attempt < MAX_BODY_RETRIES => {
                body_attempt += 1;
                let delay = backoff(body_attempt);
                log::warn!(
                    "Feed body read failed (body retry {body_attempt}/{MAX_BODY_RETRIES}), \
                     re-fetching in {delay:?}: status={status}, \
                     content-length={content_length:?}, error: {e}"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                log::error!(
                    "Feed body read failed after {MAX_BODY_RETRIES} retries: \
                     status={status}, content-length={content_length:?}, error: {e}"
                );
                return Err(SourceError::Http(e));
            }
        }
    }
}

/// Sends the request, retrying transient failures up to `max_retries`
/// times. Returns the first non-error response.
#[allow(clippy::future_not_send)]
async fn send_inner<F>(build_request: &F, max_retries: u32) -> Result<reqwest::Response, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;

    loop {
        let last_attempt = attempt >= max_retries;

        match build_request().send().await {
            Err(e) => {
                if !is_transient(&e) || last_attempt {
                    return Err(SourceError::Http(e));
                }
                log::warn!("  transient error: {e}");
            }
            Ok(response) => {
                let status = response.status();
                let retryable = status == reqwest::StatusCode::TOO_MANY_REQUESTS
                    || status.is_server_error();

                if retryable && !last_attempt {
                    log::warn!("  HTTP {status}");
                } else if retryable {
                    return Err(SourceError::Status {
                        message: format!("HTTP {status} after {max_retries} retries"),
                    });
                } else if status.is_client_error() {
                    return Err(SourceError::Status {
                        message: format!("HTTP {status}"),
                    });
                } else {
                    return Ok(response);
                }
            }
        }

        attempt += 1;
        let delay = backoff(attempt);
        log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
        tokio::time::sleep(delay).await;
    }
}

/// Exponential backoff: 2s, 4s, 8s, ...
const fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt)
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_decode() || e.is_request()
}
