//! Decoding of the `{"error": [...], "result": ...}` wrapper around every response

use crate::domain::errors::{KrakenError, KrakenResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    #[serde(default)]
    pub error: Vec<String>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(result: T) -> Self {
        Self {
            error: Vec::new(),
            result: Some(result),
        }
    }

    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            error: errors,
            result: None,
        }
    }
}

/// Parse the envelope and return its result payload
///
/// A non-empty error list wins even when a result is also present.
pub fn parse_envelope(raw: &[u8]) -> KrakenResult<Value> {
    let envelope: Envelope<Value> = serde_json::from_slice(raw)
        .map_err(|e| KrakenError::MalformedEnvelope(e.to_string()))?;

    if !envelope.error.is_empty() {
        return Err(KrakenError::Api(envelope.error));
    }

    match envelope.result {
        Some(Value::Null) | None => Err(KrakenError::MalformedEnvelope(
            "response has neither errors nor a result".to_string(),
        )),
        Some(result) => Ok(result),
    }
}

/// Convert a result payload into the method's typed shape
pub fn decode_payload<T: DeserializeOwned>(payload: Value) -> KrakenResult<T> {
    serde_json::from_value(payload).map_err(|source| KrakenError::Decode {
        target: std::any::type_name::<T>(),
        source,
    })
}

pub fn decode<T: DeserializeOwned>(raw: &[u8]) -> KrakenResult<T> {
    decode_payload(parse_envelope(raw)?)
}

pub fn decode_value(raw: &[u8]) -> KrakenResult<Value> {
    parse_envelope(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::market::TimeResponse;

    #[test]
    fn test_decode_typed_result() {
        let raw = br#"{"error":[],"result":{"unixtime":1616663113,"rfc1123":"Thu, 25 Mar 21 09:05:13 +0000"}}"#;
        let time: TimeResponse = decode(raw).unwrap();
        assert_eq!(time.unixtime, 1616663113);
    }

    #[test]
    fn test_errors_win_over_result() {
        let raw = br#"{"error":["EGeneral:Invalid arguments"],"result":{"unixtime":1}}"#;
        let err = decode_value(raw).unwrap_err();
        assert_eq!(
            err.api_errors(),
            Some(&["EGeneral:Invalid arguments".to_string()][..])
        );
    }

    #[test]
    fn test_missing_result_is_malformed() {
        let err = decode_value(br#"{"error":[]}"#).unwrap_err();
        assert!(matches!(err, KrakenError::MalformedEnvelope(_)));

        let err = decode_value(br#"{"error":[],"result":null}"#).unwrap_err();
        assert!(matches!(err, KrakenError::MalformedEnvelope(_)));
    }

    #[test]
    fn test_non_json_body_is_malformed() {
        let err = decode_value(b"<html>challenge</html>").unwrap_err();
        assert!(matches!(err, KrakenError::MalformedEnvelope(_)));
    }

    #[test]
    fn test_wrong_shape_names_target_type() {
        let raw = br#"{"error":[],"result":{"unixtime":"soon"}}"#;
        let err = decode::<TimeResponse>(raw).unwrap_err();
        match err {
            KrakenError::Decode { target, .. } => assert!(target.ends_with("TimeResponse")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_envelope_serializes_without_empty_result() {
        let envelope: Envelope = Envelope::failed(vec!["EAPI:Invalid nonce".to_string()]);
        assert_eq!(
            serde_json::to_string(&envelope).unwrap(),
            r#"{"error":["EAPI:Invalid nonce"]}"#
        );
    }
}
