//! Efficode wire protocol for agent interactions

pub mod bundle;
pub mod codec;
pub mod compressor;
pub mod encoding;
pub mod framer;
pub mod handler;
pub mod messages;
pub mod params;

pub use bundle::{syntax_guide, SelfExtractingPacket};
pub use codec::{Codec, DecodedFrame, EfficodeCodec, JsonCodec, MessagePackCodec};
pub use compressor::{
    compress, decompress, is_compressed, Compressor, COMPRESSION_MARKER, COMPRESSION_THRESHOLD,
};
pub use framer::{classify, decode_with_class};
pub use handler::{DefaultMessageHandler, MessageHandler};
pub use messages::{Message, MessageClass, OpCode, Params};

use crate::error::Result;

/// Encode an op code and parameters with the default codec settings
pub fn encode(op_code: impl Into<OpCode>, params: Params) -> Result<String> {
    EfficodeCodec::default().encode_parts(op_code, params)
}

/// Decode a wire string with the default codec settings
pub fn decode(wire: &str) -> Result<Message> {
    EfficodeCodec::default().decode_message(wire)
}
