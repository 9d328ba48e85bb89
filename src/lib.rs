//! Data access layer for the seminary website: a hosted-backend client with
//! resilient fetch, error classification and typed content records.

pub mod backend;
pub mod config;
pub mod observability;
pub mod resilience;
pub mod transport;

pub use backend::BackendClient;
pub use config::AppConfig;
pub use resilience::RetryingTransport;
