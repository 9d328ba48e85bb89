//! Fetch metrics.
//!
//! # Metrics
//! - `backend_fetch_attempts_total` (counter): attempts by outcome
//! - `backend_fetch_retries_total` (counter): retries by reason
//! - `backend_fetch_duration_seconds` (histogram): logical call latency, retries included
//! - `storage_uploads_total` (counter): uploads by terminal outcome
//!
//! No recorder is installed here; the embedding process decides where
//! metrics go. Without one the calls are no-ops.

use std::time::Instant;

use metrics::{counter, histogram};

/// Record the outcome of one attempt: `success`, `status`, `timeout`, `network` or `rejected`.
pub fn record_attempt(outcome: &'static str) {
    counter!("backend_fetch_attempts_total", "outcome" => outcome).increment(1);
}

/// Record that a retry was scheduled.
pub fn record_retry(reason: &'static str) {
    counter!("backend_fetch_retries_total", "reason" => reason).increment(1);
}

/// Record the latency of a whole logical call.
pub fn record_fetch_duration(start: Instant) {
    histogram!("backend_fetch_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record the terminal state of an upload.
pub fn record_upload(outcome: &'static str) {
    counter!("storage_uploads_total", "outcome" => outcome).increment(1);
}
