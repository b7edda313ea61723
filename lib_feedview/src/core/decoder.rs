//! # Payload Decoder
//!
//! Turns the bytes of a feed message into something the normalizer can read.
//! Decoding never fails: a payload that is not valid JSON is carried forward
//! as raw text so one bad message cannot stall the feed.

use serde_json::Value;

use crate::connections::RawMessage;

/// The result of decoding one feed message.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedPayload {
    /// The payload parsed as JSON.
    Structured(Value),
    /// The payload did not parse; the original text is kept unchanged.
    Degraded(String),
}

impl DecodedPayload {
    /// True for payloads that fell back to raw text.
    pub fn is_degraded(&self) -> bool {
        matches!(self, DecodedPayload::Degraded(_))
    }
}

/// Decodes a raw feed message.
///
/// Bytes are read as UTF-8; invalid sequences are replaced rather than
/// rejected. The text is then parsed as JSON, and on failure returned as
/// [`DecodedPayload::Degraded`].
pub fn decode(raw: &RawMessage) -> DecodedPayload {
    decode_bytes(raw.payload())
}

/// Same as [`decode`] but for a bare byte slice.
pub fn decode_bytes(bytes: &[u8]) -> DecodedPayload {
    let text = String::from_utf8_lossy(bytes);
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => DecodedPayload::Structured(value),
        Err(e) => {
            log::debug!("Payload is not JSON ({}), keeping raw text ({} bytes)", e, bytes.len());
            DecodedPayload::Degraded(text.into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_object_is_structured() {
        let raw = RawMessage::new("t", br#"{"intent":"buy","pValue":0.2}"#.to_vec());
        assert_eq!(
            decode(&raw),
            DecodedPayload::Structured(json!({"intent": "buy", "pValue": 0.2}))
        );
    }

    #[test]
    fn malformed_json_degrades_to_raw_text() {
        let decoded = decode_bytes(b"not json{");
        assert_eq!(decoded, DecodedPayload::Degraded("not json{".to_string()));
        assert!(decoded.is_degraded());
    }

    #[test]
    fn empty_payload_degrades() {
        assert_eq!(decode_bytes(b""), DecodedPayload::Degraded(String::new()));
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let decoded = decode_bytes(&[0x66, 0x6f, 0xff, 0x6f]);
        assert_eq!(decoded, DecodedPayload::Degraded("fo\u{fffd}o".to_string()));
    }

    #[test]
    fn json_scalars_are_still_structured() {
        assert_eq!(decode_bytes(b"17"), DecodedPayload::Structured(json!(17)));
        assert_eq!(decode_bytes(b"\"hi\""), DecodedPayload::Structured(json!("hi")));
    }
}
