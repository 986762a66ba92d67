/*
[INPUT]:  EVM private key (hex string)
[OUTPUT]: Account lists and personal_sign signatures for a local EVM key
[POS]:    Auth layer - private-key backed wallet provider
[UPDATE]: When signing logic or supported RPC methods change
*/

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use serde_json::{Value, json};

use crate::auth::provider::{
    ETH_ACCOUNTS, ETH_REQUEST_ACCOUNTS, INTERNAL_ERROR_CODE, PERSONAL_SIGN, ProviderRpcError,
    UNSUPPORTED_METHOD_CODE,
};
use crate::auth::WalletProvider;
use crate::http::{Result, WalletAuthError};

/// EIP-1193 code for a request on an account the provider has not authorized
const UNAUTHORIZED_CODE: i64 = 4100;
/// JSON-RPC code for malformed params
const INVALID_PARAMS_CODE: i64 = -32602;

/// Wallet provider backed by a local EVM private key
///
/// Behaves like an extension that has not been connected yet: `eth_accounts`
/// is empty until `eth_requestAccounts` has been called once.
pub struct LocalEvmProvider {
    signer: PrivateKeySigner,
    address: String,
    is_metamask: bool,
    connected: AtomicBool,
}

impl LocalEvmProvider {
    /// Create a new provider from a hex-encoded private key
    ///
    /// Supports both "0x"-prefixed and non-prefixed hex strings.
    pub fn new(private_key_hex: &str) -> Result<Self> {
        let private_key_hex = private_key_hex.trim();
        let private_key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);
        let signer = PrivateKeySigner::from_str(private_key_hex)
            .map_err(|e| WalletAuthError::Config(format!("Invalid EVM private key: {e}")))?;

        let address = signer.address().to_checksum(None);

        Ok(Self {
            signer,
            address,
            is_metamask: true,
            connected: AtomicBool::new(false),
        })
    }

    /// Override the brand flag reported to `is_metamask`
    pub fn with_metamask_flag(mut self, is_metamask: bool) -> Self {
        self.is_metamask = is_metamask;
        self
    }

    /// Start already connected, so `eth_accounts` answers without a prompt
    pub fn connected(self) -> Self {
        self.connected.store(true, Ordering::SeqCst);
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn accounts(&self) -> Value {
        if self.connected.load(Ordering::SeqCst) {
            json!([self.address])
        } else {
            json!([])
        }
    }

    async fn personal_sign(&self, params: &Value) -> std::result::Result<Value, ProviderRpcError> {
        let message = params
            .get(0)
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderRpcError::new(INVALID_PARAMS_CODE, "missing message param"))?;
        let address = params
            .get(1)
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderRpcError::new(INVALID_PARAMS_CODE, "missing address param"))?;

        if !address.eq_ignore_ascii_case(&self.address) {
            return Err(ProviderRpcError::new(
                UNAUTHORIZED_CODE,
                format!("Account {address} is not authorized"),
            ));
        }

        let signature = self
            .signer
            .sign_message(&message_bytes(message))
            .await
            .map_err(|e| ProviderRpcError::new(INTERNAL_ERROR_CODE, e.to_string()))?;

        // [r, s, v]
        Ok(Value::String(format!("0x{}", hex::encode(signature.as_bytes()))))
    }
}

/// Hex-prefixed messages are signed as raw bytes, anything else as UTF-8 text
fn message_bytes(message: &str) -> Vec<u8> {
    message
        .strip_prefix("0x")
        .and_then(|raw| hex::decode(raw).ok())
        .unwrap_or_else(|| message.as_bytes().to_vec())
}

#[async_trait]
impl WalletProvider for LocalEvmProvider {
    fn is_metamask(&self) -> bool {
        self.is_metamask
    }

    async fn request(
        &self,
        method: &str,
        params: Value,
    ) -> std::result::Result<Value, ProviderRpcError> {
        match method {
            ETH_ACCOUNTS => Ok(self.accounts()),
            ETH_REQUEST_ACCOUNTS => {
                self.connected.store(true, Ordering::SeqCst);
                Ok(self.accounts())
            }
            PERSONAL_SIGN => self.personal_sign(&params).await,
            other => Err(ProviderRpcError::new(
                UNSUPPORTED_METHOD_CODE,
                format!("Unsupported method: {other}"),
            )),
        }
    }
}
