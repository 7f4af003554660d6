//! Message types and structures for the protocol

use crate::error::FramingError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Ordered parameter mapping carried by every message
pub type Params = IndexMap<String, Value>;

/// Operation code classifying a message's intent
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OpCode {
    /// Identity claim
    Did,
    /// Request
    Req,
    /// Data transfer
    Data,
    /// Acknowledgment
    Ack,
    /// Error report
    Error,
    /// Any caller-supplied token outside the documented vocabulary
    Custom(String),
}

impl OpCode {
    pub fn as_str(&self) -> &str {
        match self {
            OpCode::Did => "DID",
            OpCode::Req => "REQ",
            OpCode::Data => "DATA",
            OpCode::Ack => "ACK",
            OpCode::Error => "ERROR",
            OpCode::Custom(token) => token,
        }
    }

    /// Message class (and therefore wire prefix) this op code frames as
    pub fn class(&self) -> MessageClass {
        match self {
            OpCode::Did => MessageClass::Identity,
            OpCode::Ack | OpCode::Error => MessageClass::Status,
            _ => MessageClass::Query,
        }
    }

    /// Check that the token cannot break the framing grammar
    pub fn validate(&self) -> Result<(), FramingError> {
        let token = self.as_str();
        let unsafe_char = |c: char| {
            matches!(c, ':' | '?' | '&' | '=') || c.is_whitespace() || c.is_control()
        };

        if token.is_empty() || token.chars().any(unsafe_char) {
            return Err(FramingError::InvalidOpCode(token.to_string()));
        }

        Ok(())
    }
}

impl From<&str> for OpCode {
    fn from(token: &str) -> Self {
        match token {
            "DID" => OpCode::Did,
            "REQ" => OpCode::Req,
            "DATA" => OpCode::Data,
            "ACK" => OpCode::Ack,
            "ERROR" => OpCode::Error,
            other => OpCode::Custom(other.to_string()),
        }
    }
}

impl From<String> for OpCode {
    fn from(token: String) -> Self {
        match OpCode::from(token.as_str()) {
            OpCode::Custom(_) => OpCode::Custom(token),
            known => known,
        }
    }
}

impl From<OpCode> for String {
    fn from(op: OpCode) -> Self {
        match op {
            OpCode::Custom(token) => token,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three framing families, one per wire prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageClass {
    /// `@` identity messages with a JSON body
    Identity,
    /// `#` request/data messages with a query-string body
    Query,
    /// `!` acknowledgment/error messages with a JSON body
    Status,
}

impl MessageClass {
    pub fn prefix(self) -> char {
        match self {
            MessageClass::Identity => '@',
            MessageClass::Query => '#',
            MessageClass::Status => '!',
        }
    }

    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix {
            '@' => Some(MessageClass::Identity),
            '#' => Some(MessageClass::Query),
            '!' => Some(MessageClass::Status),
            _ => None,
        }
    }

    /// Separator between op code and body
    pub fn separator(self) -> char {
        match self {
            MessageClass::Query => '?',
            _ => ':',
        }
    }

    /// Key under which an unparseable JSON body is kept verbatim
    pub(crate) fn raw_body_key(self) -> &'static str {
        match self {
            MessageClass::Status => "message",
            _ => "value",
        }
    }
}

/// A single protocol message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Operation code
    pub op_code: OpCode,

    /// Message parameters
    #[serde(default)]
    pub params: Params,
}

impl Message {
    pub fn new(op_code: impl Into<OpCode>, params: Params) -> Self {
        Self {
            op_code: op_code.into(),
            params,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Identity claim carrying arbitrary JSON parameters
    pub fn did(params: Params) -> Self {
        Self::new(OpCode::Did, params)
    }

    pub fn request(content: impl Into<String>, request_type: impl Into<String>) -> Self {
        Self::new(OpCode::Req, Params::new())
            .with_param("content", Value::String(content.into()))
            .with_param("type", Value::String(request_type.into()))
    }

    pub fn data(content: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self::new(OpCode::Data, Params::new())
            .with_param("content", Value::String(content.into()))
            .with_param("type", Value::String(data_type.into()))
    }

    pub fn ack(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(OpCode::Ack, Params::new())
            .with_param("status", Value::String(status.into()))
            .with_param("message", Value::String(message.into()))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(OpCode::Error, Params::new()).with_param("message", Value::String(message.into()))
    }

    pub fn class(&self) -> MessageClass {
        self.op_code.class()
    }

    pub fn is_ack(&self) -> bool {
        self.op_code == OpCode::Ack
    }

    pub fn is_error(&self) -> bool {
        self.op_code == OpCode::Error
    }

    /// String parameter lookup
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    /// Content carried by a REQ or DATA message.
    ///
    /// Structured content is returned as its JSON text.
    pub fn content(&self) -> Option<String> {
        if !matches!(self.op_code, OpCode::Req | OpCode::Data) {
            return None;
        }

        match self.params.get("content")? {
            Value::String(text) => Some(text.clone()),
            Value::Null => None,
            structured => Some(structured.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_op_code_classes() {
        assert_eq!(OpCode::Did.class().prefix(), '@');
        assert_eq!(OpCode::Ack.class().prefix(), '!');
        assert_eq!(OpCode::Error.class().prefix(), '!');
        assert_eq!(OpCode::Req.class().prefix(), '#');
        assert_eq!(OpCode::Data.class().prefix(), '#');
        assert_eq!(OpCode::from("PING").class(), MessageClass::Query);
    }

    #[test]
    fn test_op_code_parsing_is_case_sensitive() {
        assert_eq!(OpCode::from("DATA"), OpCode::Data);
        assert_eq!(OpCode::from("data"), OpCode::Custom("data".to_string()));
        assert_eq!(String::from(OpCode::from("XFER".to_string())), "XFER");
    }

    #[test]
    fn test_op_code_validation() {
        assert!(OpCode::from("REQ").validate().is_ok());
        assert!(OpCode::from("SYNC_2").validate().is_ok());
        assert!(OpCode::from("").validate().is_err());
        assert!(OpCode::from("A:B").validate().is_err());
        assert!(OpCode::from("A B").validate().is_err());
        assert!(OpCode::from("A\nB").validate().is_err());
    }

    #[test]
    fn test_prefix_lookup() {
        assert_eq!(MessageClass::from_prefix('@'), Some(MessageClass::Identity));
        assert_eq!(MessageClass::from_prefix('#'), Some(MessageClass::Query));
        assert_eq!(MessageClass::from_prefix('!'), Some(MessageClass::Status));
        assert_eq!(MessageClass::from_prefix('x'), None);
    }

    #[test]
    fn test_constructors() {
        let msg = Message::data("hello", "text");
        assert_eq!(msg.op_code, OpCode::Data);
        assert_eq!(msg.param_str("content"), Some("hello"));
        assert_eq!(msg.param_str("type"), Some("text"));

        let ack = Message::ack("success", "stored");
        assert!(ack.is_ack());
        assert!(!ack.is_error());

        let err = Message::error("boom");
        assert!(err.is_error());
        assert_eq!(err.param_str("message"), Some("boom"));
    }

    #[test]
    fn test_content_accessor() {
        assert_eq!(Message::request("q", "question").content().as_deref(), Some("q"));

        let structured = Message::new(OpCode::Data, Params::new())
            .with_param("content", json!({"k": 1}));
        assert_eq!(structured.content().as_deref(), Some(r#"{"k":1}"#));

        assert_eq!(Message::error("x").content(), None);
    }

    #[test]
    fn test_envelope_serialization() {
        let msg = Message::error("bad");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"op_code":"ERROR","params":{"message":"bad"}}"#);

        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
