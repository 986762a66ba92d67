/*
[INPUT]:  Wallet address and signature from the handshake
[OUTPUT]: Serializable request bodies for auth endpoints
[POS]:    Data layer - request bodies
[UPDATE]: When backend request schema changes
*/

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonceRequest {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifySignatureRequest {
    pub address: String,
    pub signature: String,
}
