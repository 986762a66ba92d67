/*
[INPUT]:  HTTP configuration (base URL, timeouts, endpoint paths)
[OUTPUT]: Configured reqwest client and envelope-decoded responses
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing envelope handling
*/

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::http::{Result, WalletAuthError};
use crate::types::ApiEnvelope;

const DEFAULT_NONCE_PATH: &str = "/auth/nonce";
const DEFAULT_VERIFY_PATH: &str = "/auth/verify";
const DEFAULT_PROFILE_PATH: &str = "/user/profile";

/// Paths of the three auth endpoints, relative to the base URL
///
/// A leading `/` is ignored, so `/auth/nonce` under `https://host/api`
/// resolves to `https://host/api/auth/nonce`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub nonce: String,
    pub verify: String,
    pub profile: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            nonce: DEFAULT_NONCE_PATH.to_string(),
            verify: DEFAULT_VERIFY_PATH.to_string(),
            profile: DEFAULT_PROFILE_PATH.to_string(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub endpoints: Endpoints,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            endpoints: Endpoints::default(),
        }
    }
}

/// HTTP client for the authentication backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: Url,
    endpoints: Endpoints,
}

impl ApiClient {
    /// Create a new client with default configuration
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, ClientConfig::default())
    }

    /// Create a new client with custom configuration
    ///
    /// Any path on `base_url` is kept as a prefix for every endpoint.
    pub fn with_config(base_url: &str, config: ClientConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: normalize_base_url(Url::parse(base_url)?),
            endpoints: config.endpoints,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Build request builder for an endpoint path
    pub(crate) fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(endpoint.trim_start_matches('/'))?;
        Ok(self.http_client.request(method, url))
    }

    /// Build request builder carrying a bearer token
    pub(crate) fn request_with_bearer(
        &self,
        method: Method,
        endpoint: &str,
        token: &str,
    ) -> Result<RequestBuilder> {
        Ok(self.request(method, endpoint)?.bearer_auth(token))
    }

    /// Send a request and unwrap the `{ code, data, message }` envelope.
    ///
    /// Fails with `HttpStatus` on non-2xx transport status, `BackendRejected`
    /// when the envelope code is not the success value, and `InvalidResponse`
    /// when a successful envelope carries no usable `data`.
    pub(crate) async fn send_envelope<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "backend response");

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiEnvelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.message)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "request failed".to_string());
            return Err(WalletAuthError::http_status(status, message));
        }

        let envelope: ApiEnvelope<serde_json::Value> = serde_json::from_slice(&body)
            .map_err(|e| WalletAuthError::InvalidResponse(format!("Invalid envelope: {e}")))?;

        if !envelope.is_success() {
            return Err(WalletAuthError::BackendRejected {
                code: envelope.code,
                message: envelope
                    .message
                    .unwrap_or_else(|| "request failed".to_string()),
            });
        }

        let data = envelope
            .data
            .ok_or_else(|| WalletAuthError::InvalidResponse("envelope missing 'data'".to_string()))?;

        serde_json::from_value(data)
            .map_err(|e| WalletAuthError::InvalidResponse(format!("Unexpected 'data' shape: {e}")))
    }
}

/// Trailing `/` so that relative joins append to the base path
fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
