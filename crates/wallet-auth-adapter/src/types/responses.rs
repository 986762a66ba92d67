/*
[INPUT]:  Backend JSON envelopes
[OUTPUT]: Typed Rust response structs with serialization support
[POS]:    Data layer - type definitions for backend responses
[UPDATE]: When backend schema changes or new types added
*/

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Application-level success code carried in every envelope body
pub const SUCCESS_CODE: i64 = 200;

/// Outer `{ code, data, message }` structure wrapping every backend response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonceData {
    pub nonce: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyData {
    pub token: String,
    #[serde(default)]
    pub user: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_without_data_or_message() {
        let envelope: ApiEnvelope<NonceData> =
            serde_json::from_str(r#"{"code": 401}"#).unwrap();
        assert!(!envelope.is_success());
        assert!(envelope.data.is_none());
        assert!(envelope.message.is_none());
    }

    #[test]
    fn test_verify_data_keeps_user_opaque() {
        let envelope: ApiEnvelope<VerifyData> = serde_json::from_str(
            r#"{"code": 200, "data": {"token": "a.b.c", "user": {"id": 1, "vip": true}}}"#,
        )
        .unwrap();
        assert!(envelope.is_success());
        let data = envelope.data.unwrap();
        assert_eq!(data.token, "a.b.c");
        assert_eq!(data.user["vip"], Value::Bool(true));
    }
}
