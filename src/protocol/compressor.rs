//! Size-triggered, tagged payload compression.
//!
//! Payloads at or above the threshold are rewritten as
//! `EFFICODE:` + base64(percent-encode(text)). Decompression is total: anything
//! that does not reverse cleanly is handed back unchanged.

use super::encoding::{decode_payload, encode_payload};
use crate::error::CompressionError;
use serde_json::Value;
use tracing::{debug, warn};

/// Byte size at which content gets compressed
pub const COMPRESSION_THRESHOLD: usize = 500;

/// Tag prefixed to every compressed payload
pub const COMPRESSION_MARKER: &str = "EFFICODE:";

/// Payload compressor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compressor {
    threshold: usize,
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new(COMPRESSION_THRESHOLD)
    }
}

impl Compressor {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Whether `content` is large enough to be compressed
    pub fn should_compress(&self, content: &str) -> bool {
        content.len() >= self.threshold
    }

    /// Compress text content, returning it unchanged below the threshold
    pub fn compress(&self, content: &str) -> String {
        if !self.should_compress(content) {
            return content.to_string();
        }

        let compressed = tag(content);
        debug!(
            original = content.len(),
            compressed = compressed.len(),
            "Compressed payload"
        );
        compressed
    }

    /// Compress raw bytes, which must be UTF-8 text
    pub fn compress_bytes(&self, content: &[u8]) -> Result<String, CompressionError> {
        let text = std::str::from_utf8(content)
            .map_err(|e| CompressionError::NonText(format!("invalid UTF-8 ({})", e)))?;
        Ok(self.compress(text))
    }

    /// Compress a JSON value, which must be a string
    pub fn compress_value(&self, content: &Value) -> Result<String, CompressionError> {
        match content {
            Value::String(text) => Ok(self.compress(text)),
            other => Err(CompressionError::NonText(json_kind(other).to_string())),
        }
    }

    /// Reverse [`Compressor::compress`]; never fails
    pub fn decompress(&self, content: &str) -> String {
        decompress(content)
    }
}

/// Compress with the default threshold
pub fn compress(content: &str) -> String {
    Compressor::default().compress(content)
}

/// Unconditionally produce the tagged form of `content`
pub(crate) fn tag(content: &str) -> String {
    format!("{}{}", COMPRESSION_MARKER, encode_payload(content))
}

/// Whether `content` carries the compression marker
pub fn is_compressed(content: &str) -> bool {
    content.starts_with(COMPRESSION_MARKER)
}

/// Decompress marker-tagged or envelope-framed content.
///
/// Plain text, and anything that fails to decode, is returned unchanged.
pub fn decompress(content: &str) -> String {
    if let Some(data) = content.strip_prefix(COMPRESSION_MARKER) {
        return match decode_payload(data) {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to decompress tagged payload, passing through: {}", e);
                content.to_string()
            }
        };
    }

    if let Some(data) = envelope_data(content) {
        return match decode_payload(&data) {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to decompress payload envelope, passing through: {}", e);
                content.to_string()
            }
        };
    }

    content.to_string()
}

/// Extract `data` from a `{"method": ..., "data": ...}` envelope
fn envelope_data(content: &str) -> Option<String> {
    if !content.trim_start().starts_with('{') {
        return None;
    }

    let parsed: Value = serde_json::from_str(content).ok()?;
    let object = parsed.as_object()?;

    if !object.get("method").is_some_and(is_truthy) {
        return None;
    }

    match object.get("data")? {
        Value::String(data) if !data.is_empty() => Some(data.clone()),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
