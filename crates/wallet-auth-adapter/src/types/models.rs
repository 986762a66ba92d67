/*
[INPUT]:  Handshake results and persisted session values
[OUTPUT]: Domain structs shared by the auth client and session guard
[POS]:    Data layer - domain models
[UPDATE]: When login results or persisted session layout change
*/

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of a completed wallet login handshake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginOutcome {
    pub token: String,
    pub user: Value,
    pub address: String,
}

/// Token and address as persisted in the session store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub address: String,
}
