//! Transport subsystem.
//!
//! # Data Flow
//! ```text
//! BackendClient builds a RequestDescriptor
//!     → resilience::RetryingTransport (per-attempt timeout, bounded retry)
//!     → http.rs (reqwest client, one attempt)
//!     → TransportResponse handed back unchanged
//! ```
//!
//! # Design Decisions
//! - `Transport` is the only seam between the backend client and the network
//! - The retry wrapper implements `Transport` itself, so callers never know
//!   whether retries happened
//! - Response bodies are read lazily; a discarded attempt never reads its body

pub mod http;
pub mod request;
pub mod response;
#[cfg(test)]
pub(crate) mod scripted;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

pub use http::HttpTransport;
pub use request::RequestDescriptor;
pub use response::TransportResponse;

/// Errors raised while performing a single request attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The attempt did not produce a response before its deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection refused, reset, DNS failure and similar network faults.
    #[error("failed to fetch: {0}")]
    Network(String),

    /// The request could not be built (bad URL, bad header value).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Reading the response body failed after headers were received.
    #[error("failed to read response body: {0}")]
    Body(String),
}

impl TransportError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Timeout(_) | TransportError::Network(_))
    }
}

/// A single-attempt request executor.
pub trait Transport: Send + Sync {
    type Response: TransportResponse;

    fn execute(
        &self,
        request: RequestDescriptor,
    ) -> impl Future<Output = Result<Self::Response, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    type Response = T::Response;

    fn execute(
        &self,
        request: RequestDescriptor,
    ) -> impl Future<Output = Result<Self::Response, TransportError>> + Send {
        (**self).execute(request)
    }
}
