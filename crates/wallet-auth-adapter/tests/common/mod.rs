/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for wallet-auth-adapter tests

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use wallet_auth_adapter::{ApiClient, MemoryStore, MockWalletProvider, WalletAuthClient, WalletProvider};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ADDRESS: &str = "0xABC0000000000000000000000000000000000123";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// JWT-shaped token with the given payload
pub fn make_jwt(payload: serde_json::Value) -> String {
    let header = serde_json::json!({"alg": "HS256", "typ": "JWT"});
    let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).unwrap());
    let payload_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap());
    format!("{header_b64}.{payload_b64}.signature")
}

/// Token expiring one hour from now
pub fn valid_jwt() -> String {
    let exp = chrono::Utc::now().timestamp() + 3600;
    make_jwt(serde_json::json!({"sub": "1", "exp": exp}))
}

pub fn client_for(
    server: &MockServer,
    provider: &MockWalletProvider,
    store: &MemoryStore,
) -> WalletAuthClient {
    let provider: Arc<dyn WalletProvider> = Arc::new(provider.clone());
    let api = ApiClient::new(&server.uri()).unwrap();
    WalletAuthClient::new(Some(provider), api, Arc::new(store.clone()))
}

pub async fn mount_nonce(server: &MockServer, nonce: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/nonce"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 200,
            "data": {"nonce": nonce},
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}
