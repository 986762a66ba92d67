/*
[INPUT]:  Wallet provider, backend client and session store
[OUTPUT]: Session tokens, signatures and provider errors
[POS]:    Auth layer - wallet sign-in handshake
[UPDATE]: When auth flow or provider integration changes
*/

pub mod client;
pub mod evm_wallet;
pub mod provider;

pub use client::{DEFAULT_MESSAGE_TEMPLATE, NONCE_PLACEHOLDER, WalletAuthClient};
pub use evm_wallet::LocalEvmProvider;
pub use provider::{MockWalletProvider, ProviderCall, ProviderRpcError, WalletProvider};
