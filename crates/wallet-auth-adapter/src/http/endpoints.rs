/*
[INPUT]:  Wallet address, signature, bearer token
[OUTPUT]: Nonce, verified session token and user profile
[POS]:    HTTP layer - authentication and profile endpoints
[UPDATE]: When backend paths or request bodies change
*/

// ### Auth Endpoints

use reqwest::Method;
use serde_json::Value;

use crate::http::{ApiClient, Result};
use crate::types::{NonceData, NonceRequest, VerifyData, VerifySignatureRequest};

impl ApiClient {
    /// Request a fresh nonce for an address
    ///
    /// POST {nonce} body `{ address }`
    pub async fn fetch_nonce(&self, address: &str) -> Result<NonceData> {
        let body = NonceRequest {
            address: address.to_string(),
        };
        let builder = self.request(Method::POST, &self.endpoints().nonce)?;
        self.send_envelope(builder.json(&body)).await
    }

    /// Exchange a signed nonce message for a session token
    ///
    /// POST {verify} body `{ address, signature }`
    pub async fn submit_signature(&self, address: &str, signature: &str) -> Result<VerifyData> {
        let body = VerifySignatureRequest {
            address: address.to_string(),
            signature: signature.to_string(),
        };
        let builder = self.request(Method::POST, &self.endpoints().verify)?;
        self.send_envelope(builder.json(&body)).await
    }

    /// Fetch the profile of the token's owner
    ///
    /// GET {profile} with `Authorization: Bearer <token>`
    pub async fn fetch_profile(&self, token: &str) -> Result<Value> {
        let builder = self.request_with_bearer(Method::GET, &self.endpoints().profile, token)?;
        self.send_envelope(builder).await
    }
}
