/*
[INPUT]:  JWT-shaped session tokens and a reference time
[OUTPUT]: Decoded payload claims and expiry decisions
[POS]:    Session layer - offline token inspection
[UPDATE]: When token encoding or expiry rules change
*/

use base64::{
    Engine as _,
    engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD},
};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::http::{Result, WalletAuthError};

/// Decoded middle segment of a session token
///
/// Opaque apart from the `exp` and `sub` claims.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenPayload {
    claims: Map<String, Value>,
}

impl TokenPayload {
    /// Expiry in seconds since epoch; `None` when absent or not numeric
    pub fn exp(&self) -> Option<i64> {
        match self.claims.get("exp")? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.floor() as i64)),
            _ => None,
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp()?, 0)
    }

    pub fn subject(&self) -> Option<&str> {
        self.claims.get("sub").and_then(Value::as_str)
    }

    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.claims.get(claim)
    }

    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }
}

/// Split a token into its three segments and parse the payload
pub fn decode(token: &str) -> Result<TokenPayload> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(WalletAuthError::MalformedToken(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    let payload_b64 = segments[1];
    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .or_else(|_| URL_SAFE.decode(payload_b64))
        .or_else(|_| STANDARD.decode(payload_b64))
        .or_else(|_| STANDARD_NO_PAD.decode(payload_b64))
        .map_err(|e| WalletAuthError::MalformedToken(format!("payload is not base64: {e}")))?;

    let payload: Value = serde_json::from_slice(&payload_bytes)
        .map_err(|e| WalletAuthError::MalformedToken(format!("payload is not JSON: {e}")))?;

    match payload {
        Value::Object(claims) => Ok(TokenPayload { claims }),
        _ => Err(WalletAuthError::MalformedToken(
            "payload is not a JSON object".to_string(),
        )),
    }
}

/// Expired iff `exp <= now`; malformed tokens and a missing `exp` count as expired
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match decode(token).map(|payload| payload.exp()) {
        Ok(Some(exp)) => exp <= now.timestamp(),
        Ok(None) | Err(_) => true,
    }
}

pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}

/// Seconds until `exp`, negative once expired; `None` if out of `i64` range
pub fn time_until_expiry_at(token: &str, now: DateTime<Utc>) -> Option<i64> {
    let exp = decode(token).ok()?.exp()?;
    exp.checked_sub(now.timestamp())
}

pub fn time_until_expiry(token: &str) -> Option<i64> {
    time_until_expiry_at(token, Utc::now())
}
