//! Error types for the Efficode codec

use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Main error type for the codec and its surrounding services
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Framing error: {0}")]
    Framing(#[from] FramingError),

    #[error("Compression error: {0}")]
    Compression(#[from] CompressionError),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Decoding error: {0}")]
    Decoding(String),

    #[error("Message too large: {size} bytes (max: {max_size} bytes)")]
    MessageTooLarge { size: usize, max_size: usize },

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors raised while mapping wire strings to messages and back
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FramingError {
    #[error("empty message")]
    Empty,

    #[error("invalid prefix: {0:?}")]
    InvalidPrefix(char),

    #[error("missing op code after prefix {0:?}")]
    MissingOpCode(char),

    #[error("invalid op code: {0:?}")]
    InvalidOpCode(String),
}

/// Errors raised by the compressor for caller contract violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompressionError {
    #[error("only text content can be compressed, got {0}")]
    NonText(String),
}

/// Reasons a compressed payload could not be reversed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("invalid base64: {0}")]
    Base64(String),

    #[error("decoded payload is not text")]
    NotText,

    #[error("malformed percent escape")]
    Escape,
}

impl From<config::ConfigError> for CodecError {
    fn from(err: config::ConfigError) -> Self {
        CodecError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing_error_messages() {
        assert_eq!(FramingError::Empty.to_string(), "empty message");
        assert!(FramingError::InvalidPrefix('x').to_string().starts_with("invalid prefix"));
    }

    #[test]
    fn test_payload_error_messages() {
        assert_eq!(
            PayloadError::Base64("bad byte".to_string()).to_string(),
            "invalid base64: bad byte"
        );
        assert_eq!(PayloadError::NotText.to_string(), "decoded payload is not text");
        assert_eq!(PayloadError::Escape.to_string(), "malformed percent escape");

        let err: Box<dyn std::error::Error> = Box::new(PayloadError::Escape);
        assert_eq!(err.to_string(), "malformed percent escape");
    }

    #[test]
    fn test_wraps_into_codec_error() {
        let err: CodecError = FramingError::Empty.into();
        assert!(matches!(err, CodecError::Framing(FramingError::Empty)));

        let err: CodecError = CompressionError::NonText("number".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Compression error: only text content can be compressed, got number"
        );
    }
}
