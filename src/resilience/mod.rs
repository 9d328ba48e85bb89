//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to hosted backend:
//!     → timeouts.rs (fresh deadline for every attempt)
//!     → On failure: retries.rs (classify, decide, wait backoff.rs delay)
//!     → Next attempt, or hand the final response/error back to the caller
//! ```
//!
//! # Design Decisions
//! - Timeouts are per attempt, never a shared deadline across attempts
//! - Attempts are strictly sequential; no hedged or parallel retries
//! - A response the transport accepted as successful is never retried
//! - Every call owns its retry budget; nothing is shared between calls

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use backoff::{Backoff, BackoffKind};
pub use retries::{RetrySettings, RetryingTransport, StatusPolicy};
