//! Self-extracting packets and the protocol syntax guide.
//!
//! A self-extracting packet carries REQ/DATA content in tagged form together
//! with the guide needed to read it back, so a peer without the codec can still
//! recover the payload.

use super::compressor::{decompress, tag, Compressor, COMPRESSION_MARKER};
use super::messages::{Message, OpCode};
use crate::error::{CodecError, Result};
use serde::{Deserialize, Serialize};

/// Human-readable description of the wire grammar
pub fn syntax_guide(threshold: usize) -> String {
    format!(
        r#"# Efficode protocol syntax

## Prefixes
  @  identity          @DID:{{"id":"..."}}
  #  request / data    #REQ?key=value&key=value
  !  ack / error       !ACK:{{"status":"..."}}

## Op codes
  DID    identity claim, JSON body
  REQ    request, query-string body
  DATA   data transfer: content, type, optional compressed flag
  ACK    acknowledgment, JSON body
  ERROR  error report, JSON body (conventionally "message")
  Any other op code is framed with the # prefix.

## Compressed content
Content of {threshold} bytes or more is sent as
  {marker}<base64(encodeURIComponent(text))>
Reverse with decodeURIComponent(atob(data)).
"#,
        threshold = threshold,
        marker = COMPRESSION_MARKER,
    )
}

/// Content bundled with everything needed to extract it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfExtractingPacket {
    pub op_code: OpCode,
    pub content_type: String,
    /// Always in tagged form, regardless of size
    pub compressed_data: String,
    pub syntax_guide: String,
    pub original_size: usize,
    pub compressed_size: usize,
    pub compression_ratio: f64,
    pub timestamp: i64,
    pub self_extracting: bool,
}

impl SelfExtractingPacket {
    /// Bundle the content of a REQ or DATA message
    pub fn from_message(message: &Message, compressor: &Compressor) -> Result<Self> {
        if !matches!(message.op_code, OpCode::Req | OpCode::Data) {
            return Err(CodecError::InvalidMessage(format!(
                "only REQ and DATA messages can be bundled, got {}",
                message.op_code
            )));
        }

        let content = message.content().ok_or_else(|| {
            CodecError::InvalidMessage("message has no content to bundle".to_string())
        })?;

        let compressed_data = tag(&content);
        let original_size = content.len();
        let compressed_size = compressed_data.len();
        let compression_ratio = if original_size > 0 {
            compressed_size as f64 / original_size as f64
        } else {
            0.0
        };

        Ok(Self {
            op_code: message.op_code.clone(),
            content_type: message.param_str("type").unwrap_or("text").to_string(),
            compressed_data,
            syntax_guide: syntax_guide(compressor.threshold()),
            original_size,
            compressed_size,
            compression_ratio,
            timestamp: chrono::Utc::now().timestamp(),
            self_extracting: true,
        })
    }

    /// Recover the bundled content
    pub fn extract(&self) -> String {
        decompress(&self.compressed_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::Params;

    #[test]
    fn test_bundle_and_extract() {
        let message = Message::data("a small payload", "answer");
        let packet = SelfExtractingPacket::from_message(&message, &Compressor::default()).unwrap();

        assert!(packet.self_extracting);
        assert_eq!(packet.op_code, OpCode::Data);
        assert_eq!(packet.content_type, "answer");
        assert!(packet.compressed_data.starts_with(COMPRESSION_MARKER));
        assert_eq!(packet.original_size, 15);
        assert_eq!(packet.extract(), "a small payload");
    }

    #[test]
    fn test_default_content_type() {
        let message = Message::new(OpCode::Req, Params::new()).with_param("content", "q");
        let packet = SelfExtractingPacket::from_message(&message, &Compressor::default()).unwrap();
        assert_eq!(packet.content_type, "text");
    }

    #[test]
    fn test_rejects_status_messages() {
        let result = SelfExtractingPacket::from_message(&Message::ack("ok", "x"), &Compressor::default());
        assert!(matches!(result, Err(CodecError::InvalidMessage(_))));
    }

    #[test]
    fn test_rejects_missing_content() {
        let message = Message::new(OpCode::Data, Params::new());
        assert!(SelfExtractingPacket::from_message(&message, &Compressor::default()).is_err());
    }

    #[test]
    fn test_syntax_guide_mentions_threshold_and_marker() {
        let guide = syntax_guide(500);
        assert!(guide.contains("500 bytes"));
        assert!(guide.contains("EFFICODE:<base64"));
        assert!(guide.contains(r#"@DID:{"id":"..."}"#));
    }
}
