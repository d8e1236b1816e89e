//! Wire shapes shared by the transports.
//!
//! The structured channel exchanges a JSON 2-tuple `[name, args]` and gets
//! back an envelope `{error, data}`. The socket exchanges framed request/
//! response objects correlated by `request_id`, plus an unsolicited
//! notification frame that carries no id at all.

use crate::BackendError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Encode a call for the structured channel: `[name, args]`.
pub fn encode_channel_request(name: &str, args: &[Value]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&(name, args))
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChannelEnvelope {
    pub error: bool,
    pub data: Value,
}

/// Decode the channel reply envelope into the caller-visible result.
pub fn decode_channel_response(raw: &str) -> Result<Result<Value, BackendError>, serde_json::Error> {
    let envelope: ChannelEnvelope = serde_json::from_str(raw)?;
    if envelope.error {
        let err: BackendError = serde_json::from_value(envelope.data)?;
        Ok(Err(err))
    } else {
        Ok(Ok(envelope.data))
    }
}

/// Outbound socket frame. `parameters` always carries the argument list.
#[derive(Debug, Serialize, Deserialize)]
pub struct RequestFrame {
    pub request_id: u64,
    pub name: String,
    pub parameters: Value,
}

/// Any inbound socket frame. A `request_id` marks a response to a pending
/// call; a frame without one is a backend-initiated notification.
#[derive(Debug, Deserialize, Serialize)]
pub struct InboundFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u64>,
    #[serde(default)]
    pub error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

impl InboundFrame {
    /// The result carried by a response frame.
    pub fn into_result(self) -> Result<Value, BackendError> {
        let data = self.data.unwrap_or(Value::Null);
        if self.error {
            match serde_json::from_value::<BackendError>(data) {
                Ok(err) => Err(err),
                Err(e) => Err(BackendError::decode(e)),
            }
        } else {
            Ok(data)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn channel_request_is_a_two_tuple() {
        let raw = encode_channel_request("open_database", &[json!("path/to/db"), json!(true)])
            .unwrap();
        let parsed: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, json!(["open_database", ["path/to/db", true]]));
    }

    #[test]
    fn channel_round_trip_preserves_arguments() {
        // Representative shapes: empty list, nulls, nested objects.
        for args in [
            json!([]),
            json!([null]),
            json!([{"nested": {"deep": [1, 2, 3]}}, "text", 0.5]),
        ] {
            let list = args.as_array().unwrap().clone();
            let raw = encode_channel_request("echo", &list).unwrap();
            let parsed: (String, Vec<Value>) = serde_json::from_str(&raw).unwrap();
            assert_eq!(parsed.0, "echo");
            assert_eq!(Value::Array(parsed.1), args);
        }
    }

    #[test]
    fn channel_success_envelope_decodes_payload() {
        let result = decode_channel_response(r#"{"error": false, "data": {"count": 3}}"#).unwrap();
        assert_eq!(result.unwrap(), json!({"count": 3}));
    }

    #[test]
    fn channel_error_envelope_decodes_descriptor() {
        let raw = r#"{"error": true, "data": {"name": "invalid path", "message": "no such directory"}}"#;
        let err = decode_channel_response(raw).unwrap().unwrap_err();
        assert_eq!(err.name, "invalid path");
        assert_eq!(err.message, "no such directory");
    }

    #[test]
    fn response_frame_routes_by_request_id() {
        let frame: InboundFrame =
            serde_json::from_str(r#"{"request_id": 7, "error": false, "data": [1, 2]}"#).unwrap();
        assert_eq!(frame.request_id, Some(7));
        assert_eq!(frame.into_result().unwrap(), json!([1, 2]));
    }

    #[test]
    fn notification_frame_has_no_request_id() {
        let frame: InboundFrame =
            serde_json::from_str(r#"{"parameters": {"name": "scan_progress", "done": 10}}"#)
                .unwrap();
        assert_eq!(frame.request_id, None);
        assert_eq!(
            frame.parameters,
            Some(json!({"name": "scan_progress", "done": 10}))
        );
    }
}
