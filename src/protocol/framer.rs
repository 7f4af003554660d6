//! Single-line framing: `<prefix><op code>[<separator><body>]`.
//!
//! The prefix is chosen from the op code (`@` DID, `!` ACK/ERROR, `#` anything
//! else) and determines how the body is read back. Framing never touches
//! compression; see [`super::codec::EfficodeCodec`] for that.

use super::messages::{Message, MessageClass, OpCode, Params};
use super::params::{decode_query, encode_query};
use crate::error::{CodecError, FramingError, Result};
use serde_json::Value;
use tracing::debug;

/// Frame a message as a wire string
pub fn encode_message(message: &Message) -> Result<String> {
    message.op_code.validate()?;

    let class = message.class();
    let mut wire = String::new();
    wire.push(class.prefix());
    wire.push_str(message.op_code.as_str());

    match class {
        MessageClass::Identity | MessageClass::Status => {
            if !message.params.is_empty() {
                let body = serde_json::to_string(&message.params)
                    .map_err(|e| CodecError::Encoding(e.to_string()))?;
                wire.push(':');
                wire.push_str(&body);
            }
        }
        MessageClass::Query => {
            let body = encode_query(&message.params);
            if !body.is_empty() {
                wire.push('?');
                wire.push_str(&body);
            }
        }
    }

    Ok(wire)
}

/// Parse a wire string into a message without resolving compression
pub fn decode_message(wire: &str) -> std::result::Result<Message, FramingError> {
    decode_with_class(wire).map(|(_, message)| message)
}

/// Classify a wire string by its prefix and op code.
///
/// A custom op code arriving under `@` or `!` keeps the class of its prefix
/// here, while [`Message::class`] reports where it would be framed on encode.
pub fn classify(wire: &str) -> std::result::Result<(MessageClass, OpCode), FramingError> {
    decode_with_class(wire).map(|(class, message)| (class, message.op_code))
}

/// Parse a wire string, returning the class selected by its prefix
pub fn decode_with_class(wire: &str) -> std::result::Result<(MessageClass, Message), FramingError> {
    let wire = wire.trim_end_matches(['\r', '\n']);

    let mut chars = wire.chars();
    let prefix = chars.next().ok_or(FramingError::Empty)?;
    let class = MessageClass::from_prefix(prefix).ok_or_else(|| {
        debug!("Rejected wire string with prefix {:?}", prefix);
        FramingError::InvalidPrefix(prefix)
    })?;

    let rest = chars.as_str();
    let (op_code, body) = match rest.split_once(class.separator()) {
        Some((op_code, body)) => (op_code, Some(body)),
        None => (rest, None),
    };

    if op_code.is_empty() {
        return Err(FramingError::MissingOpCode(prefix));
    }

    let params = match (class, body) {
        (_, None) => Params::new(),
        (MessageClass::Query, Some(body)) => decode_query(body),
        (_, Some(body)) => decode_json_body(class, body),
    };

    Ok((class, Message::new(op_code, params)))
}

/// Parse a JSON object body, wrapping anything else as a raw string value
fn decode_json_body(class: MessageClass, body: &str) -> Params {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map.into_iter().collect(),
        _ => {
            debug!("Body of {:?} message is not a JSON object, keeping it raw", class);
            let mut params = Params::new();
            params.insert(
                class.raw_body_key().to_string(),
                Value::String(body.to_string()),
            );
            params
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, Value)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_encode_did() {
        let msg = Message::new("DID", params(&[("id", json!("abc"))]));
        assert_eq!(encode_message(&msg).unwrap(), r#"@DID:{"id":"abc"}"#);
    }

    #[test]
    fn test_encode_req() {
        let msg = Message::new("REQ", params(&[("a", json!("1")), ("b", json!("2"))]));
        assert_eq!(encode_message(&msg).unwrap(), "#REQ?a=1&b=2");
    }

    #[test]
    fn test_encode_empty_params_has_no_body() {
        assert_eq!(encode_message(&Message::new("ACK", Params::new())).unwrap(), "!ACK");
        assert_eq!(encode_message(&Message::new("DID", Params::new())).unwrap(), "@DID");
        assert_eq!(encode_message(&Message::new("REQ", Params::new())).unwrap(), "#REQ");

        let only_nulls = Message::new("REQ", params(&[("x", Value::Null)]));
        assert_eq!(encode_message(&only_nulls).unwrap(), "#REQ");
    }

    #[test]
    fn test_encode_nested_json() {
        let msg = Message::new(
            "ACK",
            params(&[("status", json!("ok")), ("detail", json!({"n": [1, 2]}))]),
        );
        assert_eq!(
            encode_message(&msg).unwrap(),
            r#"!ACK:{"status":"ok","detail":{"n":[1,2]}}"#
        );
    }

    #[test]
    fn test_encode_custom_op_code_uses_query_prefix() {
        let msg = Message::new("PING", params(&[("seq", json!("7"))]));
        assert_eq!(encode_message(&msg).unwrap(), "#PING?seq=7");
    }

    #[test]
    fn test_encode_rejects_unframeable_op_code() {
        let msg = Message::new("BAD?OP", Params::new());
        assert!(matches!(
            encode_message(&msg),
            Err(CodecError::Framing(FramingError::InvalidOpCode(_)))
        ));
    }

    #[test]
    fn test_decode_did() {
        let msg = decode_message(r#"@DID:{"id":"abc"}"#).unwrap();
        assert_eq!(msg.op_code, OpCode::Did);
        assert_eq!(msg.params, params(&[("id", json!("abc"))]));
    }

    #[test]
    fn test_decode_splits_on_first_colon() {
        let msg = decode_message(r#"@DID:{"did":"did:efficode:42"}"#).unwrap();
        assert_eq!(msg.param_str("did"), Some("did:efficode:42"));
    }

    #[test]
    fn test_decode_error_with_raw_body() {
        let msg = decode_message("!ERROR:not json").unwrap();
        assert_eq!(msg.op_code, OpCode::Error);
        assert_eq!(msg.params, params(&[("message", json!("not json"))]));
    }

    #[test]
    fn test_decode_did_with_raw_body() {
        let msg = decode_message("@DID:agent-7").unwrap();
        assert_eq!(msg.params, params(&[("value", json!("agent-7"))]));
    }

    #[test]
    fn test_decode_non_object_json_is_wrapped() {
        let msg = decode_message("!ACK:42").unwrap();
        assert_eq!(msg.params, params(&[("message", json!("42"))]));
    }

    #[test]
    fn test_decode_without_body() {
        let msg = decode_message("#REQ").unwrap();
        assert_eq!(msg.op_code, OpCode::Req);
        assert!(msg.params.is_empty());

        let msg = decode_message("!ACK").unwrap();
        assert!(msg.params.is_empty());
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(decode_message(""), Err(FramingError::Empty));
        assert_eq!(decode_message("xyz"), Err(FramingError::InvalidPrefix('x')));
        assert_eq!(decode_message("@"), Err(FramingError::MissingOpCode('@')));
        assert_eq!(decode_message("#?a=1"), Err(FramingError::MissingOpCode('#')));
    }

    #[test]
    fn test_decode_strips_line_terminator() {
        let msg = decode_message("!ERROR:oops\r\n").unwrap();
        assert_eq!(msg.param_str("message"), Some("oops"));
    }

    #[test]
    fn test_round_trip_with_separator_collisions() {
        let original = Message::new(
            "REQ",
            params(&[("q", json!("a&b=c:d?e")), ("note", json!("100% sure"))]),
        );
        let wire = encode_message(&original).unwrap();
        assert!(!wire.contains(' '));
        assert_eq!(decode_message(&wire).unwrap(), original);
    }

    #[test]
    fn test_wire_is_single_line() {
        let msg = Message::new("ACK", params(&[("message", json!("line1\nline2"))]));
        assert!(!encode_message(&msg).unwrap().contains('\n'));

        let msg = Message::new("REQ", params(&[("message", json!("line1\nline2"))]));
        assert!(!encode_message(&msg).unwrap().contains('\n'));
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify("#DATA?content=x").unwrap(),
            (MessageClass::Query, OpCode::Data)
        );
        // a custom op code arriving under `!` stays in the status class
        assert_eq!(
            classify("!NOTE:{}").unwrap(),
            (MessageClass::Status, OpCode::Custom("NOTE".to_string()))
        );
        assert!(classify("?").is_err());
    }
}
