/*
[INPUT]:  HTTP client configuration and backend endpoints
[OUTPUT]: HTTP responses and typed backend results
[POS]:    HTTP layer - REST backend communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod endpoints;
pub mod error;

pub use error::{Result, USER_REJECTED_CODE, WalletAuthError};

pub use client::{ApiClient, ClientConfig, Endpoints};
