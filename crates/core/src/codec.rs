//! Envelope codec: base64-wrapped JSON.
//!
//! Requests carry a base64 string that decodes to a JSON payload. Every
//! response is wrapped as `{result: 1, data: ...}`, serialized to JSON and
//! base64 encoded the same way.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::constants::ENVELOPE_RESULT_OK;

/// Failure to serialize a typed payload into a JSON tree.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Payload could not be represented as JSON.
    #[error("Failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Fixed outer shape of every encoded response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Always [`ENVELOPE_RESULT_OK`]; outcomes travel inside `data`.
    pub result: u8,
    /// Response payload.
    pub data: T,
}

impl<T> Envelope<T> {
    /// Wrap `data` in the standard envelope.
    pub fn new(data: T) -> Self {
        Self {
            result: ENVELOPE_RESULT_OK,
            data,
        }
    }
}

/// Decode a base64 blob into a JSON value.
///
/// Returns `None` on malformed base64, non-UTF-8 bytes or malformed JSON.
/// Callers cannot tell which stage failed.
pub fn decode(blob: &str) -> Option<Value> {
    let bytes = match STANDARD.decode(blob.trim()) {
        Ok(bytes) => bytes,
        Err(err) => {
            debug!(error = %err, "payload is not valid base64");
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(error = %err, "payload is not valid JSON");
            None
        }
    }
}

/// Decode a base64 blob straight into a typed payload.
///
/// A value that decodes but does not fit `T` is also `None`.
pub fn decode_as<T: DeserializeOwned>(blob: &str) -> Option<T> {
    let value = decode(blob)?;
    match serde_json::from_value(value) {
        Ok(typed) => Some(typed),
        Err(err) => {
            debug!(error = %err, "payload has unexpected shape");
            None
        }
    }
}

/// Serialize a JSON value to compact text and base64 encode it.
pub fn encode(value: &Value) -> String {
    STANDARD.encode(value.to_string())
}

/// Wrap `data` in an [`Envelope`] and encode it.
pub fn encode_envelope<T: Serialize>(data: &T) -> Result<String, CodecError> {
    let value = serde_json::to_value(Envelope::new(data))?;
    Ok(encode(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip_value_trees() {
        let values = [
            json!(null),
            json!(true),
            json!(-17),
            json!(0.1),
            json!(1.0e-7),
            json!(i64::MAX),
            json!(u64::MAX),
            json!("päivää 🎮"),
            json!([]),
            json!({}),
            json!([1, "two", null, [false], {"k": 3.5}]),
            json!({
                "user_id": 999,
                "moderator_id": 22358445,
                "reason": "spam",
                "nested": {"list": [1, 2, 3], "empty": {}}
            }),
        ];

        for value in values {
            assert_eq!(decode(&encode(&value)), Some(value.clone()), "{}", value);
        }
    }

    #[test]
    fn test_decode_known_blob() {
        // {"user_id":1,"moderator_id":2}
        let blob = "eyJ1c2VyX2lkIjoxLCJtb2RlcmF0b3JfaWQiOjJ9";
        assert_eq!(
            decode(blob),
            Some(json!({"user_id": 1, "moderator_id": 2}))
        );
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        assert_eq!(decode("not base64!!"), None);
        assert_eq!(decode("abc"), None);
    }

    #[test]
    fn test_decode_rejects_bad_json() {
        let blob = STANDARD.encode("{user_id: 1");
        assert_eq!(decode(&blob), None);
    }

    #[test]
    fn test_decode_rejects_non_utf8() {
        let blob = STANDARD.encode([0xff, 0xfe, 0xfd]);
        assert_eq!(decode(&blob), None);
    }

    #[test]
    fn test_decode_empty_input() {
        assert_eq!(decode(""), None);
    }

    #[test]
    fn test_decode_trims_whitespace() {
        let blob = format!("  {}\n", encode(&json!({"a": 1})));
        assert_eq!(decode(&blob), Some(json!({"a": 1})));
    }

    #[test]
    fn test_decode_as_shape_mismatch() {
        #[derive(Debug, Deserialize)]
        struct Ids {
            #[allow(dead_code)]
            user_id: i64,
        }

        assert!(decode_as::<Ids>(&encode(&json!({"user_id": 4}))).is_some());
        assert!(decode_as::<Ids>(&encode(&json!([4]))).is_none());
        assert!(decode_as::<Ids>(&encode(&json!("4"))).is_none());
    }

    #[test]
    fn test_envelope_shape() {
        let encoded = encode_envelope(&json!({"success": true, "user_id": 7})).unwrap();
        assert_eq!(
            decode(&encoded),
            Some(json!({"result": 1, "data": {"success": true, "user_id": 7}}))
        );
    }
}
