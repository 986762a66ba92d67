/*
[INPUT]:  Wallet provider, backend client and session store
[OUTPUT]: Session token, user profile, persisted session
[POS]:    Auth layer - orchestrates complete wallet login handshake
[UPDATE]: When handshake steps, message format or persistence change
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::auth::provider::{
    ETH_ACCOUNTS, ETH_REQUEST_ACCOUNTS, INTERNAL_ERROR_CODE, PERSONAL_SIGN, WalletProvider,
};
use crate::http::{ApiClient, Result, WalletAuthError};
use crate::session::ProfileFetcher;
use crate::storage::{ADDRESS_KEY, SessionStore, TOKEN_KEY};
use crate::types::{LoginOutcome, StoredSession, VerifyData};

/// Placeholder substituted with the server nonce
pub const NONCE_PLACEHOLDER: &str = "{nonce}";

pub const DEFAULT_MESSAGE_TEMPLATE: &str =
    "Sign this message to log in with your wallet.\n\nThis request will not trigger a blockchain transaction or cost any gas fees.\n\nNonce: {nonce}";

/// Drives the wallet login handshake and session retrieval
pub struct WalletAuthClient {
    provider: Option<Arc<dyn WalletProvider>>,
    api: ApiClient,
    store: Arc<dyn SessionStore>,
    message_template: String,
    login_in_flight: AtomicBool,
}

/// Releases the in-flight flag when a login settles, on every exit path
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| WalletAuthError::LoginInProgress)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl WalletAuthClient {
    pub fn new(
        provider: Option<Arc<dyn WalletProvider>>,
        api: ApiClient,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            provider,
            api,
            store,
            message_template: DEFAULT_MESSAGE_TEMPLATE.to_string(),
            login_in_flight: AtomicBool::new(false),
        }
    }

    /// Replace the signed message template; it must contain `{nonce}`
    pub fn with_message_template(mut self, template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains(NONCE_PLACEHOLDER) {
            return Err(WalletAuthError::Config(format!(
                "message template must contain {NONCE_PLACEHOLDER}"
            )));
        }
        self.message_template = template;
        Ok(self)
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Text the wallet is asked to sign for a given nonce
    pub fn build_message(&self, nonce: &str) -> String {
        self.message_template.replace(NONCE_PLACEHOLDER, nonce)
    }

    /// A provider is injected and reports the expected wallet brand
    ///
    /// Best effort only: when several wallets compete for the injection slot
    /// no attempt is made to pick among them.
    pub fn is_provider_available(&self) -> bool {
        self.provider
            .as_ref()
            .is_some_and(|provider| provider.is_metamask())
    }

    /// Provider gated by the same check as `is_provider_available`
    fn provider(&self) -> Result<&Arc<dyn WalletProvider>> {
        self.provider
            .as_ref()
            .filter(|provider| provider.is_metamask())
            .ok_or(WalletAuthError::ProviderUnavailable)
    }

    async fn request_accounts(&self, method: &str) -> Result<Vec<String>> {
        let result = self
            .provider()?
            .request(method, json!([]))
            .await
            .map_err(WalletAuthError::from_provider)?;

        let accounts: Vec<String> =
            serde_json::from_value(result).map_err(|e| WalletAuthError::ProviderError {
                code: INTERNAL_ERROR_CODE,
                message: format!("{method} returned an unexpected result: {e}"),
            })?;

        Ok(accounts
            .into_iter()
            .filter(|account| !account.trim().is_empty())
            .collect())
    }

    /// Silent account lookup first, then a prompting connection request
    pub async fn get_wallet_address(&self) -> Result<String> {
        let mut accounts = self.request_accounts(ETH_ACCOUNTS).await?;
        if accounts.is_empty() {
            debug!("no authorized accounts, requesting connection");
            accounts = self.request_accounts(ETH_REQUEST_ACCOUNTS).await?;
        }

        accounts
            .into_iter()
            .next()
            .ok_or(WalletAuthError::NoWalletConnected)
    }

    pub async fn request_nonce(&self, address: &str) -> Result<String> {
        if address.trim().is_empty() {
            return Err(WalletAuthError::Config(
                "wallet address must not be empty".to_string(),
            ));
        }
        Ok(self.api.fetch_nonce(address).await?.nonce)
    }

    pub async fn sign_message(&self, message: &str, address: &str) -> Result<String> {
        let result = self
            .provider()?
            .request(PERSONAL_SIGN, json!([message, address]))
            .await
            .map_err(WalletAuthError::from_provider)?;

        match result {
            Value::String(signature) => Ok(signature),
            other => Err(WalletAuthError::ProviderError {
                code: INTERNAL_ERROR_CODE,
                message: format!("{PERSONAL_SIGN} returned a non-string result: {other}"),
            }),
        }
    }

    pub async fn verify_signature(&self, address: &str, signature: &str) -> Result<VerifyData> {
        self.api.submit_signature(address, signature).await
    }

    /// Complete login handshake
    ///
    /// 1. Resolve wallet address
    /// 2. Request nonce
    /// 3. Build message embedding the nonce
    /// 4. Sign message with wallet
    /// 5. Verify signature to get session token
    /// 6. Persist token and address together
    ///
    /// A second call while one is pending fails with `LoginInProgress`.
    pub async fn login(&self) -> Result<LoginOutcome> {
        let _in_flight = InFlight::acquire(&self.login_in_flight)?;

        // Step 1: Wallet address
        let address = self.get_wallet_address().await?;
        debug!(%address, "wallet address resolved");

        // Step 2: Nonce
        let nonce = self.request_nonce(&address).await?;
        debug!(%address, "nonce received");

        // Step 3: Message
        let message = self.build_message(&nonce);

        // Step 4: Sign
        let signature = self.sign_message(&message, &address).await?;
        debug!(%address, "message signed");

        // Step 5: Verify
        let VerifyData { token, user } = self.verify_signature(&address, &signature).await?;

        // Step 6: Persist both or neither
        self.store
            .set_many(&[(TOKEN_KEY, token.as_str()), (ADDRESS_KEY, address.as_str())])?;
        info!(%address, "wallet login succeeded");

        Ok(LoginOutcome {
            token,
            user,
            address,
        })
    }

    pub async fn get_profile(&self, token: &str) -> Result<Value> {
        self.api.fetch_profile(token).await
    }

    /// Clear the persisted session; safe to call when nothing is stored
    pub fn logout(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(ADDRESS_KEY)?;
        info!("session cleared");
        Ok(())
    }

    /// Persisted token and address, if both are present
    pub fn stored_session(&self) -> Result<Option<StoredSession>> {
        let token = self.store.get(TOKEN_KEY)?;
        let address = self.store.get(ADDRESS_KEY)?;
        Ok(token
            .zip(address)
            .map(|(token, address)| StoredSession { token, address }))
    }
}

#[async_trait]
impl ProfileFetcher for WalletAuthClient {
    async fn fetch_profile(&self, token: &str) -> Result<Value> {
        self.get_profile(token).await
    }
}

impl std::fmt::Debug for WalletAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletAuthClient")
            .field("has_provider", &self.provider.is_some())
            .field("base_url", &self.api.base_url().as_str())
            .field("login_in_flight", &self.login_in_flight.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
