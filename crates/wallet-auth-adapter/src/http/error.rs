/*
[INPUT]:  Error sources (wallet provider, HTTP, backend envelope, storage, tokens)
[OUTPUT]: Structured error types with retry and recovery hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

use crate::auth::ProviderRpcError;

/// EIP-1193 code reported by providers when the user dismisses a prompt
pub const USER_REJECTED_CODE: i64 = 4001;

/// Main error type for the wallet auth adapter
#[derive(Error, Debug)]
pub enum WalletAuthError {
    /// No compatible wallet provider was injected
    #[error("No compatible wallet provider available")]
    ProviderUnavailable,

    /// Neither silent nor prompted account lookup returned an address
    #[error("No wallet connected")]
    NoWalletConnected,

    /// User declined a connection or signing prompt
    #[error("User rejected the request: {message}")]
    UserRejected { message: String },

    /// Any other wallet-side failure, surfaced verbatim
    #[error("Wallet provider error (code {code}): {message}")]
    ProviderError { code: i64, message: String },

    /// Transport failure reaching the backend
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered with a non-2xx transport status
    #[error("HTTP status {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// Backend answered 2xx but the envelope code is not the success value
    #[error("Backend rejected request (code {code}): {message}")]
    BackendRejected { code: i64, message: String },

    /// Token is not a three-segment JWT with a JSON payload
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Envelope was successful but its data did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session store read/write failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Another login handshake on this client has not settled yet
    #[error("A login is already in progress")]
    LoginInProgress,
}

impl WalletAuthError {
    /// Map a provider RPC failure onto the crate taxonomy
    pub fn from_provider(err: ProviderRpcError) -> Self {
        if err.code == USER_REJECTED_CODE {
            WalletAuthError::UserRejected {
                message: err.message,
            }
        } else {
            WalletAuthError::ProviderError {
                code: err.code,
                message: err.message,
            }
        }
    }

    /// Create an HTTP status error from a transport status and message
    pub fn http_status(status: StatusCode, message: impl Into<String>) -> Self {
        WalletAuthError::HttpStatus {
            status: status.as_u16(),
            message: message.into(),
        }
    }

    /// Transport-level failure (connection or non-2xx status)
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            WalletAuthError::Network(_) | WalletAuthError::HttpStatus { .. }
        )
    }

    /// Check if the same call may succeed when simply retried by the caller
    pub fn is_retryable(&self) -> bool {
        self.is_network_error() || matches!(self, WalletAuthError::LoginInProgress)
    }

    /// Check if the caller must restart from `login()` with a fresh nonce
    pub fn requires_new_handshake(&self) -> bool {
        matches!(
            self,
            WalletAuthError::BackendRejected { .. } | WalletAuthError::UserRejected { .. }
        )
    }

    pub fn is_user_rejection(&self) -> bool {
        matches!(self, WalletAuthError::UserRejected { .. })
    }
}

/// Result type alias for wallet auth operations
pub type Result<T> = std::result::Result<T, WalletAuthError>;
