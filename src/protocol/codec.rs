//! Message encoding and decoding with size guards

use super::compressor::{is_compressed, Compressor};
use super::framer;
use super::messages::{Message, MessageClass, OpCode, Params};
use crate::config::CodecConfig;
use crate::error::{CodecError, Result};
use bytes::Bytes;
use serde_json::Value;
use tracing::debug;

/// Maximum message size (1 MB)
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Parameter flag redundantly marking compressed DATA content
pub const COMPRESSED_FLAG: &str = "compressed";

/// Parameter carrying DATA content
pub const CONTENT_PARAM: &str = "content";

/// Trait for message codecs
pub trait Codec: Send + Sync {
    /// Encode message to bytes
    fn encode(&self, message: &Message) -> Result<Bytes>;

    /// Decode bytes to message
    fn decode(&self, data: &[u8]) -> Result<Message>;

    /// Get codec name
    fn name(&self) -> &str;

    /// Get maximum message size
    fn max_size(&self) -> usize {
        MAX_MESSAGE_SIZE
    }
}

fn check_size(size: usize, max_size: usize) -> Result<()> {
    if size > max_size {
        return Err(CodecError::MessageTooLarge { size, max_size });
    }
    Ok(())
}

/// A decoded wire string together with how it was read
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    /// Class selected by the wire prefix
    pub class: MessageClass,
    pub message: Message,
    /// DATA content arrived compressed and was restored
    pub decompressed: bool,
}

/// The Efficode single-line text codec.
///
/// Wraps the framer with the DATA compression hook: large `content` is
/// compressed and flagged on encode, and resolved (flag removed) on decode.
#[derive(Debug, Clone, Copy)]
pub struct EfficodeCodec {
    compressor: Compressor,
    max_size: usize,
}

impl Default for EfficodeCodec {
    fn default() -> Self {
        Self::new(Compressor::default(), MAX_MESSAGE_SIZE)
    }
}

impl EfficodeCodec {
    pub fn new(compressor: Compressor, max_size: usize) -> Self {
        Self { compressor, max_size }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self::new(
            Compressor::new(config.compression_threshold),
            config.max_message_size_kb.saturating_mul(1024),
        )
    }

    pub fn compressor(&self) -> &Compressor {
        &self.compressor
    }

    /// Encode an op code and parameter set into a wire string
    pub fn encode_parts(&self, op_code: impl Into<OpCode>, params: Params) -> Result<String> {
        self.encode_message(&Message::new(op_code, params))
    }

    /// Encode a message into a wire string.
    ///
    /// The size guard only applies to inbound wire strings; tagged content
    /// grows on the wire, so outbound size is not bounded here.
    pub fn encode_message(&self, message: &Message) -> Result<String> {
        if message.op_code == OpCode::Data {
            let mut outbound = message.clone();
            self.compress_content(&mut outbound.params);
            Ok(framer::encode_message(&outbound)?)
        } else {
            Ok(framer::encode_message(message)?)
        }
    }

    /// Decode a wire string, resolving compressed DATA content
    pub fn decode_message(&self, wire: &str) -> Result<Message> {
        self.decode_frame(wire).map(|frame| frame.message)
    }

    /// Decode a wire string, keeping the class its prefix selected and
    /// whether DATA content had to be decompressed
    pub fn decode_frame(&self, wire: &str) -> Result<DecodedFrame> {
        check_size(wire.len(), self.max_size)?;

        let (class, mut message) = framer::decode_with_class(wire).map_err(|e| {
            debug!("Failed to frame inbound message: {}", e);
            e
        })?;

        let decompressed =
            message.op_code == OpCode::Data && self.resolve_content(&mut message.params);

        Ok(DecodedFrame {
            class,
            message,
            decompressed,
        })
    }

    fn compress_content(&self, params: &mut Params) {
        let Some(Value::String(content)) = params.get(CONTENT_PARAM) else {
            return;
        };
        if !self.compressor.should_compress(content) {
            return;
        }

        let compressed = self.compressor.compress(content);
        debug!(
            original = content.len(),
            compressed = compressed.len(),
            "Compressed DATA content"
        );
        params.insert(CONTENT_PARAM.to_string(), Value::String(compressed));
        params.insert(COMPRESSED_FLAG.to_string(), Value::Bool(true));
    }

    /// Returns true when content was flagged or tagged and has been resolved
    fn resolve_content(&self, params: &mut Params) -> bool {
        let flagged = matches!(
            params.get(COMPRESSED_FLAG),
            Some(Value::Bool(true))
        ) || params.get(COMPRESSED_FLAG).and_then(Value::as_str) == Some("true");

        let Some(Value::String(content)) = params.get(CONTENT_PARAM) else {
            return false;
        };
        if !flagged && !is_compressed(content) {
            return false;
        }

        let decompressed = self.compressor.decompress(content);
        params.insert(CONTENT_PARAM.to_string(), Value::String(decompressed));
        params.shift_remove(COMPRESSED_FLAG);
        true
    }
}

impl Codec for EfficodeCodec {
    fn encode(&self, message: &Message) -> Result<Bytes> {
        self.encode_message(message).map(Bytes::from)
    }

    fn decode(&self, data: &[u8]) -> Result<Message> {
        check_size(data.len(), self.max_size)?;

        let wire = std::str::from_utf8(data)
            .map_err(|e| CodecError::Decoding(format!("wire string is not UTF-8: {}", e)))?;
        self.decode_message(wire)
    }

    fn name(&self) -> &str {
        "efficode"
    }

    fn max_size(&self) -> usize {
        self.max_size
    }
}

/// JSON envelope codec (`{"op_code": ..., "params": {...}}`)
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, message: &Message) -> Result<Bytes> {
        let json = serde_json::to_vec(message)
            .map_err(|e| CodecError::Encoding(e.to_string()))?;

        check_size(json.len(), MAX_MESSAGE_SIZE)?;

        Ok(Bytes::from(json))
    }

    fn decode(&self, data: &[u8]) -> Result<Message> {
        check_size(data.len(), MAX_MESSAGE_SIZE)?;

        // Deserialize (serde_json has built-in recursion limits)
        let message = serde_json::from_slice(data)
            .map_err(|e| CodecError::Decoding(e.to_string()))?;

        Ok(message)
    }

    fn name(&self) -> &str {
        "json"
    }
}

/// MessagePack envelope codec
pub struct MessagePackCodec;

impl Codec for MessagePackCodec {
    fn encode(&self, message: &Message) -> Result<Bytes> {
        let msgpack = rmp_serde::to_vec_named(message)
            .map_err(|e| CodecError::Encoding(e.to_string()))?;

        check_size(msgpack.len(), MAX_MESSAGE_SIZE)?;

        Ok(Bytes::from(msgpack))
    }

    fn decode(&self, data: &[u8]) -> Result<Message> {
        check_size(data.len(), MAX_MESSAGE_SIZE)?;

        let message = rmp_serde::from_slice(data)
            .map_err(|e| CodecError::Decoding(e.to_string()))?;

        Ok(message)
    }

    fn name(&self) -> &str {
        "messagepack"
    }
}
