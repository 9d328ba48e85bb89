//! Response abstraction over a single attempt.

use std::future::Future;

use reqwest::StatusCode;

use super::TransportError;

/// The parts of a response the retry wrapper and client need.
///
/// The body is only read through `into_body`, which consumes the response.
pub trait TransportResponse: Send + 'static {
    fn status(&self) -> StatusCode;

    fn into_body(self) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;
}

impl TransportResponse for reqwest::Response {
    fn status(&self) -> StatusCode {
        reqwest::Response::status(self)
    }

    async fn into_body(self) -> Result<Vec<u8>, TransportError> {
        self.bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| TransportError::Body(e.to_string()))
    }
}
