//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_BACKEND_URL: &str = "SEMINARY_BACKEND_URL";
pub const ENV_ANON_KEY: &str = "SEMINARY_BACKEND_ANON_KEY";
pub const ENV_LOG_LEVEL: &str = "SEMINARY_LOG_LEVEL";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse a TOML document without touching the environment.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Apply environment overrides from any `(name, value)` source.
pub fn apply_overrides<I>(config: &mut AppConfig, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (name, value) in vars {
        match name.as_str() {
            ENV_BACKEND_URL => config.backend.url = value,
            ENV_ANON_KEY => config.backend.anon_key = value,
            ENV_LOG_LEVEL => config.observability.log_level = value,
            _ => {}
        }
    }
}

/// Load configuration: optional TOML file, then environment overrides, then validation.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            parse_config(&content)?
        }
        None => AppConfig::default(),
    };

    apply_overrides(&mut config, std::env::vars());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_file_values() {
        let mut config = parse_config(
            r#"
            [backend]
            url = "https://old.supabase.co"
            anon_key = "old"
            "#,
        )
        .unwrap();

        apply_overrides(
            &mut config,
            vec![
                (ENV_BACKEND_URL.to_string(), "https://new.supabase.co".to_string()),
                (ENV_LOG_LEVEL.to_string(), "debug".to_string()),
                ("UNRELATED".to_string(), "x".to_string()),
            ],
        );

        assert_eq!(config.backend.url, "https://new.supabase.co");
        assert_eq!(config.backend.anon_key, "old");
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = parse_config("[retries]\nmax_retries = \"three\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("Parse error"));
    }

    #[test]
    fn test_validation_errors_are_joined() {
        let err = ConfigError::Validation(vec![ValidationError::MissingAnonKey, ValidationError::ZeroTimeout]);
        assert_eq!(
            err.to_string(),
            "Validation failed: backend.anon_key must not be empty, retries.timeout_ms must be greater than zero"
        );
    }
}
