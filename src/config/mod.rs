//! Configuration management for the codec and its gateway

use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod loader;
pub mod validation;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub codec: CodecConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Codec configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Content size in bytes at which DATA content is compressed.
    /// Peers assume 500.
    #[serde(default = "default_compression_threshold")]
    pub compression_threshold: usize,

    /// Maximum wire message size in KB
    #[serde(default = "default_max_message_size")]
    pub max_message_size_kb: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            compression_threshold: default_compression_threshold(),
            max_message_size_kb: default_max_message_size(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json, compact or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Gateway server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server port
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Server host
    #[serde(default = "default_server_host")]
    pub host: String,

    /// Maximum request body size in KB
    #[serde(default = "default_max_body_size")]
    pub max_body_size_kb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            host: default_server_host(),
            max_body_size_kb: default_max_body_size(),
        }
    }
}

// Default value functions
fn default_compression_threshold() -> usize { crate::protocol::COMPRESSION_THRESHOLD }
fn default_max_message_size() -> usize { 1024 }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }
fn default_server_port() -> u16 { 8080 }
fn default_server_host() -> String { "0.0.0.0".to_string() }
fn default_max_body_size() -> usize { 2048 }

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let config = loader::load_config(path)?;
        validation::validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let config = loader::load_config_with_env(path)?;
        validation::validate_config(&config)?;
        Ok(config)
    }

    /// Validate this configuration
    pub fn validate(&self) -> crate::error::Result<()> {
        validation::validate_config(self)
    }

    /// Create default configuration
    pub fn default_config() -> Self {
        Self {
            codec: CodecConfig::default(),
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}
