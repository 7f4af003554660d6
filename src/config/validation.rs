//! Configuration validation

use super::*;
use crate::error::{CodecError, Result};
use crate::protocol::COMPRESSION_THRESHOLD;
use tracing::warn;

/// Supported log output formats
const LOG_FORMATS: &[&str] = &["json", "compact", "pretty"];

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_codec_config(&config.codec)?;
    validate_logging_config(&config.logging)?;
    validate_server_config(&config.server)?;
    Ok(())
}

/// Validate codec configuration
fn validate_codec_config(config: &CodecConfig) -> Result<()> {
    if config.compression_threshold == 0 {
        return Err(CodecError::Config(
            "Compression threshold must be greater than 0".to_string()
        ));
    }

    if config.compression_threshold != COMPRESSION_THRESHOLD {
        warn!(
            "Compression threshold {} differs from the {} bytes peers assume",
            config.compression_threshold, COMPRESSION_THRESHOLD
        );
    }

    if config.max_message_size_kb == 0 {
        return Err(CodecError::Config(
            "Max message size must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    if config.level.trim().is_empty() {
        return Err(CodecError::Config(
            "Log level cannot be empty".to_string()
        ));
    }

    if !LOG_FORMATS.contains(&config.format.as_str()) {
        return Err(CodecError::Config(format!(
            "Unknown log format '{}' (expected one of: {})",
            config.format,
            LOG_FORMATS.join(", ")
        )));
    }

    Ok(())
}

/// Validate server configuration
fn validate_server_config(config: &ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(CodecError::Config(
            "Server host cannot be empty".to_string()
        ));
    }

    if config.port == 0 {
        return Err(CodecError::Config(
            "Server port must be greater than 0".to_string()
        ));
    }

    if config.max_body_size_kb == 0 {
        return Err(CodecError::Config(
            "Max body size must be greater than 0".to_string()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default_config()).is_ok());
    }

    #[test]
    fn test_zero_threshold() {
        let mut config = Config::default_config();
        config.codec.compression_threshold = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_non_default_threshold_is_allowed() {
        let mut config = Config::default_config();
        config.codec.compression_threshold = 2048;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_unknown_log_format() {
        let mut config = Config::default_config();
        config.logging.format = "xml".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("xml"));
    }

    #[test]
    fn test_invalid_server() {
        let mut config = Config::default_config();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default_config();
        config.server.host = String::new();
        assert!(validate_config(&config).is_err());

        let mut config = Config::default_config();
        config.server.max_body_size_kb = 0;
        assert!(validate_config(&config).is_err());
    }
}
