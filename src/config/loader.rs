//! Configuration loader with environment variable support

use super::Config;
use crate::error::Result;
use config::{Environment, File, FileFormat};
use std::path::Path;

/// Environment variable prefix, e.g. `EFFICODE__SERVER__PORT=9090`
pub const ENV_PREFIX: &str = "EFFICODE";

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let config = config::Config::builder()
        .add_source(File::from(path.as_ref()))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    Ok(cfg)
}

/// Load configuration from a TOML file with environment variable overrides
pub fn load_config_with_env<P: AsRef<Path>>(path: P) -> Result<Config> {
    let config = config::Config::builder()
        .add_source(File::from(path.as_ref()).required(false))
        .add_source(env_source())
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    Ok(cfg)
}

/// Load configuration from TOML text
pub fn load_config_from_str(toml: &str) -> Result<Config> {
    let config = config::Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    Ok(cfg)
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_str() {
        let config = load_config_from_str(
            r#"
            [codec]
            compression_threshold = 1024

            [server]
            port = 9090
            "#,
        )
        .unwrap();

        assert_eq!(config.codec.compression_threshold, 1024);
        assert_eq!(config.codec.max_message_size_kb, 1024);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.codec.compression_threshold, 500);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_config("/nonexistent/efficode.toml").is_err());
    }
}
