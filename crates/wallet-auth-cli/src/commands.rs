/*
[INPUT]:  Validated configuration
[OUTPUT]: JSON reports printed to stdout
[POS]:    Command layer - wires adapter components per subcommand
[UPDATE]: When subcommands or their output change
*/

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use tracing::{info, warn};
use wallet_auth_adapter::{
    ADDRESS_KEY, ApiClient, FileStore, LocalEvmProvider, SessionGuard, SessionState, SessionStore,
    WalletAuthClient, WalletProvider, session,
};

use crate::config::{AuthConfig, PRIVATE_KEY_ENV};

fn session_store(config: &AuthConfig) -> Arc<FileStore> {
    Arc::new(FileStore::new(&config.session_file))
}

fn build_client(
    config: &AuthConfig,
    provider: Option<Arc<dyn WalletProvider>>,
    store: Arc<dyn SessionStore>,
) -> Result<WalletAuthClient> {
    let api = ApiClient::with_config(&config.backend.base_url, config.client_config())
        .context("build backend client")?;
    WalletAuthClient::new(provider, api, store)
        .with_message_template(config.message_template.clone())
        .context("apply message template")
}

fn build_guard(config: &AuthConfig, store: Arc<dyn SessionStore>) -> SessionGuard {
    SessionGuard::new(store)
        .with_expiry_policy(config.expiry_policy)
        .with_failure_policy(config.profile_failure_policy)
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("encode output")?);
    Ok(())
}

pub async fn login(config: &AuthConfig) -> Result<()> {
    let Some(private_key) = config.private_key() else {
        bail!("no wallet key configured: set wallet.private_key or {PRIVATE_KEY_ENV}");
    };
    let provider = LocalEvmProvider::new(&private_key)
        .context("load wallet key")?
        .with_metamask_flag(config.wallet.is_metamask);

    let provider: Arc<dyn WalletProvider> = Arc::new(provider);
    let client = build_client(config, Some(provider), session_store(config))?;

    let outcome = client.login().await.context("wallet login")?;
    let expires_at = session::decode(&outcome.token)
        .ok()
        .and_then(|payload| payload.expires_at());

    print_json(&json!({
        "address": outcome.address,
        "user": outcome.user,
        "expires_at": expires_at,
    }))
}

pub fn status(config: &AuthConfig) -> Result<()> {
    let store = session_store(config);
    let address = store.get(ADDRESS_KEY).ok().flatten();
    let guard = build_guard(config, store);

    let Some(token) = guard.current_token() else {
        return print_json(&json!({"state": "unauthenticated"}));
    };

    let report = match guard.decode(&token) {
        Ok(payload) => {
            let state = if guard.is_expired(&token) { "expired" } else { "valid" };
            json!({
                "state": state,
                "address": address,
                "subject": payload.subject(),
                "expires_at": payload.expires_at(),
                "seconds_until_expiry": guard.time_until_expiry(&token),
            })
        }
        Err(e) => {
            warn!(error = %e, "stored session token is malformed");
            json!({"state": "malformed", "address": address})
        }
    };
    print_json(&report)
}

pub async fn profile(config: &AuthConfig) -> Result<()> {
    let store = session_store(config);
    let client = build_client(config, None, store.clone())?;
    let guard = build_guard(config, store);

    match guard.resolve(&client).await {
        SessionState::Authenticated(profile) => {
            print_json(&json!({"state": "authenticated", "profile": profile}))
        }
        SessionState::Error(message) => bail!("profile check failed: {message}"),
        other => {
            info!(state = ?other, "no authenticated session");
            print_json(&json!({"state": "unauthenticated"}))
        }
    }
}

pub fn logout(config: &AuthConfig) -> Result<()> {
    let client = build_client(config, None, session_store(config))?;
    client.logout().context("clear session")?;
    print_json(&json!({"state": "logged_out"}))
}
