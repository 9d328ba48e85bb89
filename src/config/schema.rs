//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::resilience::{BackoffKind, StatusPolicy};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Hosted backend endpoint and key.
    pub backend: BackendConfig,

    /// Timeout and retry behavior of every backend request.
    pub retries: RetryConfig,

    /// Storage buckets used for uploads.
    pub storage: StorageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Hosted backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Project base URL (e.g., "https://project.supabase.co").
    pub url: String,

    /// Public anon key, sent as `apikey` and as the default bearer token.
    pub anon_key: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            anon_key: String::new(),
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,

    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,

    /// Delay before retrying a transient failure, in milliseconds.
    pub backoff_ms: u64,

    /// Cap for exponential backoff in milliseconds.
    pub max_backoff_ms: u64,

    /// Backoff strategy.
    pub backoff: BackoffKind,

    /// Which non-success statuses are retried.
    pub status_policy: StatusPolicy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout_ms: 15_000,
            backoff_ms: 1_000,
            max_backoff_ms: 8_000,
            backoff: BackoffKind::Fixed,
            status_policy: StatusPolicy::ServerErrors,
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Upload chunk size used for progress reporting, in bytes.
    pub chunk_size: usize,

    /// Upload timeout in seconds. Uploads are never retried.
    pub upload_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
            upload_timeout_secs: 120,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [backend]
            url = "https://project.supabase.co"
            anon_key = "public-anon"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.anon_key, "public-anon");
        assert_eq!(config.retries.max_retries, 3);
        assert_eq!(config.retries.timeout_ms, 15_000);
        assert_eq!(config.retries.backoff_ms, 1_000);
        assert_eq!(config.retries.status_policy, StatusPolicy::ServerErrors);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_policy_and_backoff_names() {
        let config: AppConfig = toml::from_str(
            r#"
            [retries]
            backoff = "exponential"
            status_policy = "any_non_success"

            [observability]
            log_format = "compact"
            "#,
        )
        .unwrap();

        assert_eq!(config.retries.backoff, BackoffKind::Exponential);
        assert_eq!(config.retries.status_policy, StatusPolicy::AnyNonSuccess);
        assert_eq!(config.observability.log_format, LogFormat::Compact);
    }
}
