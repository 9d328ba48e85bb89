//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → BackendClient::from_config at process start
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Environment wins over the file so secrets can stay out of it
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{AppConfig, BackendConfig, ObservabilityConfig, RetryConfig, StorageConfig};
