//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ClientConfig, ConfigError> {
    let config: ClientConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let config = parse_config("proxy = \"localhost:1234\"\npipe_capacity = 2\n").unwrap();
        assert_eq!(config.pipe_capacity, 2);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(parse_config("proxy = "), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_error_display() {
        let err = parse_config("pipe_capacity = 0\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: pipe_capacity: must be greater than zero"
        );
    }

    #[test]
    fn test_validation_lists_every_error() {
        let err = parse_config("proxy = \"\"\npipe_capacity = 0\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: proxy: must not be empty, pipe_capacity: must be greater than zero"
        );
    }

    #[test]
    fn test_parse_error_keeps_source() {
        let err = parse_config("proxy = ").unwrap_err();
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("Parse error: "));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/yt-http.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
