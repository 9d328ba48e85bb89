//! reqwest-backed transport.

use reqwest::Client;

use super::{RequestDescriptor, Transport, TransportError};

/// Performs exactly one HTTP attempt per `execute` call.
///
/// Timeouts are owned by the retry wrapper, so the reqwest client is built
/// without a request timeout of its own.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// The underlying client, for streaming uploads that bypass retries.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl Transport for HttpTransport {
    type Response = reqwest::Response;

    async fn execute(&self, request: RequestDescriptor) -> Result<reqwest::Response, TransportError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        builder.send().await.map_err(map_reqwest_error)
    }
}

pub(crate) fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_builder() {
        TransportError::InvalidRequest(e.to_string())
    } else if e.is_timeout() {
        TransportError::Timeout(std::time::Duration::ZERO)
    } else if e.is_body() || e.is_decode() {
        TransportError::Body(e.to_string())
    } else {
        TransportError::Network(e.to_string())
    }
}
