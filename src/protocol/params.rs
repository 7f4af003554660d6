//! Query-string parameter codec for `#`-prefixed messages.
//!
//! Keys and values are percent-encoded on write and percent-decoded on read.
//! Decoding is lenient: pairs without `=` or with an empty key are dropped, and
//! a component with malformed escapes is kept verbatim.

use super::encoding::{decode_component, encode_component};
use super::messages::Params;
use serde_json::Value;

/// Serialize parameters as `key=value&key=value`, skipping nulls
pub fn encode_query(params: &Params) -> String {
    params
        .iter()
        .filter_map(|(key, value)| {
            query_text(value)
                .map(|text| format!("{}={}", encode_component(key), encode_component(&text)))
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Parse a `key=value&key=value` body into string-valued parameters
pub fn decode_query(body: &str) -> Params {
    let mut params = Params::new();

    for pair in body.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        if key.is_empty() {
            continue;
        }

        params.insert(lenient_decode(key), Value::String(lenient_decode(value)));
    }

    params
}

fn lenient_decode(component: &str) -> String {
    decode_component(component).unwrap_or_else(|| component.to_string())
}

/// Text form of a parameter value on the query-string wire
fn query_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        structured => Some(structured.to_string()),
    }
}
