/*
[INPUT]:  Persisted tokens, file-backed stores and mock profile responses
[OUTPUT]: Test results for session gating
[POS]:    Integration tests - session guard
[UPDATE]: When guard transitions or token rules change
*/

mod common;

use std::sync::Arc;

use common::{ADDRESS, client_for, make_jwt, mount_nonce, setup_mock_server, valid_jwt};
use rstest::rstest;
use tokio_test::assert_ok;
use wallet_auth_adapter::{
    ADDRESS_KEY, ExpiryPolicy, FileStore, MemoryStore, MockWalletProvider, ProfileFailurePolicy,
    SessionGuard, SessionState, SessionStore, TOKEN_KEY, WalletAuthError,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[rstest]
#[case("")]
#[case("a")]
#[case("a.b")]
#[case("a.b.c.d")]
fn test_guard_decode_rejects_malformed(#[case] token: &str) {
    let guard = SessionGuard::new(Arc::new(MemoryStore::new()));
    assert!(matches!(
        guard.decode(token),
        Err(WalletAuthError::MalformedToken(_))
    ));
    assert!(guard.is_expired(token));
    assert!(guard.time_until_expiry(token).is_none());
}

#[test]
fn test_guard_expiry_helpers() {
    let guard = SessionGuard::new(Arc::new(MemoryStore::new()));

    let fresh = valid_jwt();
    assert!(!guard.is_expired(&fresh));
    let remaining = guard.time_until_expiry(&fresh).unwrap();
    assert!(remaining > 3500 && remaining <= 3600);

    let stale = make_jwt(serde_json::json!({"exp": 1}));
    assert!(guard.is_expired(&stale));
    assert!(guard.time_until_expiry(&stale).unwrap() < 0);

    let no_exp = make_jwt(serde_json::json!({"sub": "1"}));
    assert!(guard.is_expired(&no_exp));
}

#[tokio::test]
async fn test_login_then_guard_resolves_profile() {
    let server = setup_mock_server().await;
    let token = valid_jwt();
    mount_nonce(&server, "n0nce1", 1).await;
    Mock::given(method("POST"))
        .and(path("/auth/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 200,
            "data": {"token": token.clone(), "user": {"id": 1}},
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/profile"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 200,
            "data": {"id": 1, "balance": "12.5"},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    let provider = MockWalletProvider::new(ADDRESS, "sig1");
    let client = client_for(&server, &provider, &store);
    let guard = SessionGuard::new(Arc::new(store.clone()));

    assert_eq!(guard.check(), SessionState::Unauthenticated);
    assert_ok!(client.login().await);
    assert!(guard.has_valid_session());
    assert_eq!(guard.check(), SessionState::CheckingProfile);

    let state = guard.resolve(&client).await;
    assert_eq!(
        state,
        SessionState::Authenticated(serde_json::json!({"id": 1, "balance": "12.5"}))
    );
}

#[tokio::test]
async fn test_expired_token_still_fetches_profile_when_advisory() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/user/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 401,
            "message": "token expired",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    store.set(TOKEN_KEY, &make_jwt(serde_json::json!({"exp": 1}))).unwrap();
    store.set(ADDRESS_KEY, ADDRESS).unwrap();

    let provider = MockWalletProvider::new(ADDRESS, "sig1");
    let client = client_for(&server, &provider, &store);
    let guard = SessionGuard::new(Arc::new(store.clone()))
        .with_failure_policy(ProfileFailurePolicy::ClearToken);

    assert_eq!(guard.resolve(&client).await, SessionState::Unauthenticated);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_enforced_expiry_skips_profile_fetch() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/user/profile"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    store.set(TOKEN_KEY, &make_jwt(serde_json::json!({"exp": 1}))).unwrap();

    let provider = MockWalletProvider::new(ADDRESS, "sig1");
    let client = client_for(&server, &provider, &store);
    let guard = SessionGuard::new(Arc::new(store.clone())).with_expiry_policy(ExpiryPolicy::Enforce);

    assert_eq!(guard.resolve(&client).await, SessionState::Unauthenticated);
    // Enforcement does not clear the stored token
    assert!(store.get(TOKEN_KEY).unwrap().is_some());
}

#[tokio::test]
async fn test_profile_network_failure_reports_error() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/user/profile"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    store.set(TOKEN_KEY, &valid_jwt()).unwrap();

    let provider = MockWalletProvider::new(ADDRESS, "sig1");
    let client = client_for(&server, &provider, &store);
    let guard = SessionGuard::new(Arc::new(store.clone()));

    match guard.resolve(&client).await {
        SessionState::Error(message) => assert!(message.contains("502")),
        other => panic!("unexpected state: {other:?}"),
    }
    assert!(store.get(TOKEN_KEY).unwrap().is_some());
}

#[test]
fn test_guard_observes_logout_through_shared_file() {
    let mut dir = std::env::temp_dir();
    dir.push(format!("wallet-auth-session-{}", uuid::Uuid::new_v4()));
    let path = dir.join("session.json");

    let writer = FileStore::new(&path);
    let guard = SessionGuard::new(Arc::new(FileStore::new(&path)));

    writer.set(TOKEN_KEY, &valid_jwt()).unwrap();
    writer.set(ADDRESS_KEY, ADDRESS).unwrap();
    assert!(guard.has_valid_session());

    writer.remove(TOKEN_KEY).unwrap();
    writer.remove(ADDRESS_KEY).unwrap();
    assert!(!guard.has_valid_session());
    assert_eq!(guard.check(), SessionState::Unauthenticated);

    std::fs::remove_dir_all(dir).unwrap();
}
