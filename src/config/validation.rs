//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (request and upload timeouts > 0, backoff cap >= base)
//! - Check the backend URL is an absolute http(s) URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("backend.url '{0}' is not an absolute http(s) URL")]
    InvalidBackendUrl(String),

    #[error("backend.anon_key must not be empty")]
    MissingAnonKey,

    #[error("retries.timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("retries.max_backoff_ms ({max}) is lower than retries.backoff_ms ({base})")]
    BackoffCapBelowBase { base: u64, max: u64 },

    #[error("storage.upload_timeout_secs must be greater than zero")]
    ZeroUploadTimeout,

    #[error("storage.chunk_size must be greater than zero")]
    ZeroChunkSize,

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.backend.url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        _ => errors.push(ValidationError::InvalidBackendUrl(config.backend.url.clone())),
    }

    if config.backend.anon_key.trim().is_empty() {
        errors.push(ValidationError::MissingAnonKey);
    }

    if config.retries.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.retries.max_backoff_ms < config.retries.backoff_ms {
        errors.push(ValidationError::BackoffCapBelowBase {
            base: config.retries.backoff_ms,
            max: config.retries.max_backoff_ms,
        });
    }

    if config.storage.upload_timeout_secs == 0 {
        errors.push(ValidationError::ZeroUploadTimeout);
    }

    if config.storage.chunk_size == 0 {
        errors.push(ValidationError::ZeroChunkSize);
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
