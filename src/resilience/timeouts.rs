//! Timeout enforcement.
//!
//! Uses Tokio's timeout facilities. When the deadline passes the attempt
//! future is dropped, which aborts the in-flight request.

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

use crate::transport::TransportError;

/// Run one attempt under its own deadline.
pub async fn with_deadline<T, F>(limit: Duration, attempt: F) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    match timeout(limit, attempt).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout(limit)),
    }
}
