/*
[INPUT]:  EIP-1193 style JSON-RPC requests (method + params)
[OUTPUT]: Account lists, signatures, provider RPC errors
[POS]:    Auth layer - wallet provider abstraction
[UPDATE]: When adding new provider types or RPC methods
*/

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

pub const ETH_ACCOUNTS: &str = "eth_accounts";
pub const ETH_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
pub const PERSONAL_SIGN: &str = "personal_sign";

/// EIP-1193 code for a method the provider does not support
pub const UNSUPPORTED_METHOD_CODE: i64 = 4200;
/// JSON-RPC internal error code
pub const INTERNAL_ERROR_CODE: i64 = -32603;

/// Error returned by a provider `request` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRpcError {
    pub code: i64,
    pub message: String,
}

impl ProviderRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ProviderRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "provider error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for ProviderRpcError {}

/// Trait for injected wallet providers
///
/// Mirrors the request interface browser wallets expose. The trait is async
/// because every call may wait on a user prompt in the wallet UI.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Self-reported brand flag
    fn is_metamask(&self) -> bool;

    /// Perform a JSON-RPC request against the wallet
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError>;
}

/// A request recorded by [`MockWalletProvider`]
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderCall {
    pub method: String,
    pub params: Value,
}

/// Mock wallet provider for testing
///
/// Answers from scripted values and records every request in order.
#[derive(Debug, Clone)]
pub struct MockWalletProvider {
    is_metamask: bool,
    silent_accounts: Vec<String>,
    requested_accounts: Result<Vec<String>, ProviderRpcError>,
    sign_result: Result<String, ProviderRpcError>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<ProviderCall>>>,
}

impl MockWalletProvider {
    /// Create a connected MetaMask-branded mock with a predetermined signature
    pub fn new(address: &str, signature: &str) -> Self {
        Self {
            is_metamask: true,
            silent_accounts: vec![address.to_string()],
            requested_accounts: Ok(vec![address.to_string()]),
            sign_result: Ok(signature.to_string()),
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Silent lookup returns nothing; only `eth_requestAccounts` yields the address
    pub fn disconnected(mut self) -> Self {
        self.silent_accounts.clear();
        self
    }

    /// Both lookups return an empty account list
    pub fn without_accounts(mut self) -> Self {
        self.silent_accounts.clear();
        self.requested_accounts = Ok(Vec::new());
        self
    }

    pub fn with_metamask_flag(mut self, is_metamask: bool) -> Self {
        self.is_metamask = is_metamask;
        self
    }

    pub fn with_connect_error(mut self, code: i64, message: &str) -> Self {
        self.requested_accounts = Err(ProviderRpcError::new(code, message));
        self
    }

    pub fn with_sign_error(mut self, code: i64, message: &str) -> Self {
        self.sign_result = Err(ProviderRpcError::new(code, message));
        self
    }

    /// Delay every response, to observe ordering under suspension
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// All requests received so far, in order
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages passed to `personal_sign`, in order
    pub fn signed_messages(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == PERSONAL_SIGN)
            .filter_map(|call| call.params.get(0).and_then(Value::as_str).map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl WalletProvider for MockWalletProvider {
    fn is_metamask(&self) -> bool {
        self.is_metamask
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ProviderCall {
                method: method.to_string(),
                params,
            });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match method {
            ETH_ACCOUNTS => Ok(json!(self.silent_accounts)),
            ETH_REQUEST_ACCOUNTS => self.requested_accounts.clone().map(|accounts| json!(accounts)),
            PERSONAL_SIGN => self.sign_result.clone().map(Value::String),
            other => Err(ProviderRpcError::new(
                UNSUPPORTED_METHOD_CODE,
                format!("Unsupported method: {other}"),
            )),
        }
    }
}
