//! Retry logic.
//!
//! # Responsibilities
//! - Decide whether a failed attempt is worth repeating
//! - Execute retries with the configured backoff
//! - Enforce the per-call retry budget (`max_retries + 1` attempts at most)
//!
//! # Design Decisions
//! - Non-success statuses retry immediately and their bodies are never read
//! - Transient errors (timeout, network) wait the backoff delay first
//! - Invalid requests are never retried
//! - 4xx responses other than 408/429 are final under the default policy

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::schema::RetryConfig;
use crate::observability::metrics;
use crate::resilience::backoff::Backoff;
use crate::resilience::timeouts::with_deadline;
use crate::transport::{RequestDescriptor, Transport, TransportError, TransportResponse};

/// Which non-success statuses trigger another attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// 5xx, 408 Request Timeout and 429 Too Many Requests.
    #[default]
    ServerErrors,
    /// Every status outside 2xx.
    AnyNonSuccess,
}

impl StatusPolicy {
    pub fn should_retry(&self, status: StatusCode) -> bool {
        if status.is_success() {
            return false;
        }
        match self {
            StatusPolicy::AnyNonSuccess => true,
            StatusPolicy::ServerErrors => {
                status.is_server_error()
                    || status == StatusCode::REQUEST_TIMEOUT
                    || status == StatusCode::TOO_MANY_REQUESTS
            }
        }
    }
}

/// Retry parameters fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub timeout: Duration,
    pub backoff: Backoff,
    pub status_policy: StatusPolicy,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout: Duration::from_millis(15_000),
            backoff: Backoff::default(),
            status_policy: StatusPolicy::default(),
        }
    }
}

impl From<&RetryConfig> for RetrySettings {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            timeout: Duration::from_millis(config.timeout_ms),
            backoff: Backoff {
                kind: config.backoff,
                base: Duration::from_millis(config.backoff_ms),
                max: Duration::from_millis(config.max_backoff_ms),
            },
            status_policy: config.status_policy,
        }
    }
}

/// Wraps a transport with per-attempt timeouts and bounded retry.
///
/// It is a `Transport` itself and returns the inner transport's response
/// type, so call sites cannot tell whether retries happened.
#[derive(Debug, Clone)]
pub struct RetryingTransport<T> {
    inner: T,
    settings: RetrySettings,
}

impl<T: Transport> RetryingTransport<T> {
    pub fn new(inner: T, settings: RetrySettings) -> Self {
        Self { inner, settings }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn settings(&self) -> &RetrySettings {
        &self.settings
    }
}

fn error_outcome(e: &TransportError) -> &'static str {
    match e {
        TransportError::Timeout(_) => "timeout",
        TransportError::Network(_) => "network",
        TransportError::InvalidRequest(_) | TransportError::Body(_) => "rejected",
    }
}

impl<T: Transport> Transport for RetryingTransport<T> {
    type Response = T::Response;

    async fn execute(&self, request: RequestDescriptor) -> Result<T::Response, TransportError> {
        let start = Instant::now();
        let mut retries_left = self.settings.max_retries;
        let mut attempt: u32 = 0;

        loop {
            let result = with_deadline(self.settings.timeout, self.inner.execute(request.clone())).await;

            match result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        metrics::record_attempt("success");
                        metrics::record_fetch_duration(start);
                        return Ok(response);
                    }

                    metrics::record_attempt("status");
                    if retries_left > 0 && self.settings.status_policy.should_retry(status) {
                        tracing::info!(
                            url = %request.url,
                            attempt,
                            retries_left,
                            status = %status,
                            "Retrying request after non-success status"
                        );
                        metrics::record_retry("status");
                        drop(response);
                        retries_left -= 1;
                        attempt += 1;
                        continue;
                    }

                    metrics::record_fetch_duration(start);
                    return Ok(response);
                }
                Err(e) => {
                    metrics::record_attempt(error_outcome(&e));
                    if retries_left > 0 && e.is_transient() {
                        let delay = self.settings.backoff.delay(attempt + 1);
                        tracing::warn!(
                            url = %request.url,
                            attempt,
                            retries_left,
                            delay = ?delay,
                            error = %e,
                            "Fetch failed, retrying"
                        );
                        metrics::record_retry(error_outcome(&e));
                        tokio::time::sleep(delay).await;
                        retries_left -= 1;
                        attempt += 1;
                        continue;
                    }

                    tracing::error!(
                        url = %request.url,
                        attempts = attempt + 1,
                        error = %e,
                        "Fetch failed"
                    );
                    metrics::record_fetch_duration(start);
                    return Err(e);
                }
            }
        }
    }
}
