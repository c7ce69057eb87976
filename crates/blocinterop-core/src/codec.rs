// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON method codec.
//
// Byte framing used by the embedding runtime's JSON method channels:
//
//   call             {"method": "<name>", "args": <value>}
//   success reply    [<result>]
//   error reply      ["<code>", "<message>" | null, <details>]
//   not implemented  empty reply (zero bytes)

use serde_json::{Value, json};

use crate::error::{InteropError, Result};
use crate::types::{MethodCall, MethodResponse};

/// Stateless encoder/decoder for method calls and reply envelopes.
pub struct JsonMethodCodec;

impl JsonMethodCodec {
    pub fn encode_method_call(call: &MethodCall) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(call)?)
    }

    pub fn decode_method_call(bytes: &[u8]) -> Result<MethodCall> {
        serde_json::from_slice(bytes)
            .map_err(|e| InteropError::Envelope(format!("method call: {e}")))
    }

    pub fn encode_response(response: &MethodResponse) -> Result<Vec<u8>> {
        let envelope = match response {
            MethodResponse::Success(result) => json!([result]),
            MethodResponse::Error {
                code,
                message,
                details,
            } => json!([code, message, details]),
            MethodResponse::NotImplemented => return Ok(Vec::new()),
        };
        Ok(serde_json::to_vec(&envelope)?)
    }

    pub fn decode_response(bytes: &[u8]) -> Result<MethodResponse> {
        if bytes.is_empty() {
            return Ok(MethodResponse::NotImplemented);
        }

        let envelope: Value = serde_json::from_slice(bytes)
            .map_err(|e| InteropError::Envelope(format!("reply: {e}")))?;
        let Value::Array(mut items) = envelope else {
            return Err(InteropError::Envelope("reply is not an array".into()));
        };

        match items.len() {
            1 => Ok(MethodResponse::Success(items.remove(0))),
            3 => {
                let details = items.pop().unwrap_or(Value::Null);
                let message = match items.pop() {
                    Some(Value::String(message)) => Some(message),
                    Some(Value::Null) | None => None,
                    Some(other) => {
                        return Err(InteropError::Envelope(format!(
                            "error message must be a string, got {other}"
                        )));
                    }
                };
                let code = match items.pop() {
                    Some(Value::String(code)) => code,
                    other => {
                        return Err(InteropError::Envelope(format!(
                            "error code must be a string, got {other:?}"
                        )));
                    }
                };
                Ok(MethodResponse::Error {
                    code,
                    message,
                    details,
                })
            }
            n => Err(InteropError::Envelope(format!(
                "reply envelope has {n} elements, expected 1 or 3"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_call_uses_args_key() {
        let call = MethodCall::new("registerCallback", json!("updateState-1"));
        let bytes = JsonMethodCodec::encode_method_call(&call).expect("encode");
        let value: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(value, json!({"method": "registerCallback", "args": "updateState-1"}));
    }

    #[test]
    fn decode_method_call_with_object_args() {
        let bytes = br#"{"method":"updateState-1","args":{"count":3}}"#;
        let call = JsonMethodCodec::decode_method_call(bytes).expect("decode");
        assert_eq!(call.method, "updateState-1");
        assert_eq!(call.arguments, json!({"count": 3}));
    }

    #[test]
    fn decode_method_call_without_method_is_rejected() {
        let err = JsonMethodCodec::decode_method_call(br#"{"args":1}"#).unwrap_err();
        assert!(matches!(err, InteropError::Envelope(_)));
    }

    #[test]
    fn success_envelope_wraps_result_in_array() {
        let bytes = JsonMethodCodec::encode_response(&MethodResponse::Success(json!({"count": 1})))
            .expect("encode");
        assert_eq!(bytes, br#"[{"count":1}]"#);
        assert_eq!(
            JsonMethodCodec::decode_response(&bytes).expect("decode"),
            MethodResponse::Success(json!({"count": 1}))
        );
    }

    #[test]
    fn error_envelope_carries_code_message_and_details() {
        let bytes = br#"["unavailable",null,{"retry":false}]"#;
        let response = JsonMethodCodec::decode_response(bytes).expect("decode");
        assert_eq!(
            response,
            MethodResponse::Error {
                code: "unavailable".into(),
                message: None,
                details: json!({"retry": false}),
            }
        );
    }

    #[test]
    fn not_implemented_is_an_empty_reply() {
        let bytes = JsonMethodCodec::encode_response(&MethodResponse::NotImplemented).expect("encode");
        assert!(bytes.is_empty());
        assert_eq!(
            JsonMethodCodec::decode_response(&bytes).expect("decode"),
            MethodResponse::NotImplemented
        );
    }

    #[test]
    fn malformed_replies_are_envelope_errors() {
        let cases: [&[u8]; 5] = [b"{}", b"[1,2]", b"[1,null,null]", b"[\"c\",5,null]", b"not json"];
        for bytes in cases {
            let err = JsonMethodCodec::decode_response(bytes).unwrap_err();
            assert!(matches!(err, InteropError::Envelope(_)), "{bytes:?}");
        }
    }
}
