//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! resilience, backend, storage produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (attempt/retry counters, latency histogram)
//! ```
//!
//! # Design Decisions
//! - Structured fields (url, attempt, retries_left) instead of formatted strings
//! - Library code never installs a metrics recorder

pub mod logging;
pub mod metrics;
