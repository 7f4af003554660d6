//! Percent-encoding and base64 primitives shared by the compressor and the
//! query-string parameter codec.
//!
//! Percent-encoding matches JavaScript's `encodeURIComponent` byte for byte so
//! that compressed payloads interoperate with browser-side peers.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub use crate::error::PayloadError;

/// Characters left unescaped by `encodeURIComponent`: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
pub const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a string component
pub fn encode_component(text: &str) -> String {
    utf8_percent_encode(text, URI_COMPONENT).to_string()
}

/// Strictly percent-decode a string component.
///
/// Returns `None` for a `%` not followed by two hex digits or for escapes that
/// do not form valid UTF-8.
pub fn decode_component(text: &str) -> Option<String> {
    if has_malformed_escape(text) {
        return None;
    }

    percent_decode_str(text)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

fn has_malformed_escape(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let well_formed = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !well_formed {
                return true;
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    false
}

/// `btoa(encodeURIComponent(text))`
pub fn encode_payload(text: &str) -> String {
    BASE64.encode(encode_component(text))
}

/// `decodeURIComponent(atob(data))`, failing instead of throwing
pub fn decode_payload(data: &str) -> Result<String, PayloadError> {
    let raw = BASE64
        .decode(data.trim())
        .map_err(|e| PayloadError::Base64(e.to_string()))?;

    let escaped = String::from_utf8(raw).map_err(|_| PayloadError::NotText)?;

    decode_component(&escaped).ok_or(PayloadError::Escape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_encode_uri_component() {
        // encodeURIComponent("a b&c=d/é!*'()~._-")
        assert_eq!(
            encode_component("a b&c=d/é!*'()~._-"),
            "a%20b%26c%3Dd%2F%C3%A9!*'()~._-"
        );
        assert_eq!(encode_component("+:?#"), "%2B%3A%3F%23");
    }

    #[test]
    fn test_decode_component() {
        assert_eq!(decode_component("a%20b%2B").as_deref(), Some("a b+"));
        assert_eq!(decode_component("%E4%BD%A0%E5%A5%BD").as_deref(), Some("你好"));
        assert_eq!(decode_component("plain").as_deref(), Some("plain"));
    }

    #[test]
    fn test_decode_component_rejects_malformed() {
        assert_eq!(decode_component("100%"), None);
        assert_eq!(decode_component("%zz"), None);
        assert_eq!(decode_component("%4"), None);
        // lone continuation byte
        assert_eq!(decode_component("%80"), None);
    }

    #[test]
    fn test_payload_matches_browser_peer() {
        // btoa(encodeURIComponent("héllo wörld"))
        assert_eq!(encode_payload("héllo wörld"), "aCVDMyVBOWxsbyUyMHclQzMlQjZybGQ=");
        assert_eq!(
            decode_payload("aCVDMyVBOWxsbyUyMHclQzMlQjZybGQ=").unwrap(),
            "héllo wörld"
        );
    }

    #[test]
    fn test_decode_payload_failures() {
        assert!(matches!(decode_payload("not base64!"), Err(PayloadError::Base64(_))));
        // base64 of "%zz"
        assert_eq!(decode_payload("JXp6"), Err(PayloadError::Escape));
    }
}
