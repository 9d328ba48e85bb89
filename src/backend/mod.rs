//! Hosted backend subsystem.
//!
//! # Data Flow
//! ```text
//! caller
//!     → query.rs (filters, order, limit → query parameters)
//!     → client.rs (URL, apikey + bearer token from auth.rs)
//!     → transport (retrying, timed out per attempt)
//!     → client.rs (status check, BackendError decode)
//!     → records.rs (typed rows)
//!
//! On failure:
//!     errors.rs classify → display message
//!     fallback.rs → default content for public views
//!
//! Files:
//!     storage.rs → streamed upload with progress events, public URLs, removal
//! ```

pub mod auth;
pub mod client;
pub mod errors;
pub mod fallback;
pub mod query;
pub mod records;
pub mod storage;

pub use auth::Session;
pub use client::{BackendClient, DefaultTransport};
pub use errors::{classify, user_message, BackendError, Classification, ClientError, ErrorCategory, ErrorReport};
pub use fallback::{load, load_or_default, FallbackContent, Loaded};
pub use query::{Direction, OrderBy, Query};
pub use storage::{object_path, UploadEvent, UploadHandle};
