/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public wallet auth adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod http;
pub mod session;
pub mod storage;
pub mod types;

// Re-export commonly used types from auth
pub use auth::{
    LocalEvmProvider,
    MockWalletProvider,
    ProviderCall,
    ProviderRpcError,
    WalletAuthClient,
    WalletProvider,
};

// Re-export commonly used types from http
pub use http::{
    ApiClient,
    ClientConfig,
    Endpoints,
    Result,
    WalletAuthError,
};

// Re-export commonly used types from session
pub use session::{
    ExpiryPolicy,
    ProfileFailurePolicy,
    ProfileFetcher,
    SessionGuard,
    SessionState,
    TokenPayload,
};

// Re-export storage backends
pub use storage::{ADDRESS_KEY, FileStore, MemoryStore, SessionStore, TOKEN_KEY};

// Re-export all types
pub use types::*;
