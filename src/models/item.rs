//! Public token exchange models (`/item/public_token/exchange`).

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::{ItemId, RequestId};

/// Request body for `/item/public_token/exchange`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicTokenExchangeRequest {
    /// One-time token returned by Link.
    #[serde(with = "super::secret")]
    pub public_token: SecretString,
}

/// Response body of `/item/public_token/exchange`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicTokenExchangeResponse {
    /// Durable credential for the linked Item.
    #[serde(with = "super::secret")]
    pub access_token: SecretString,
    /// Identifier of the linked Item.
    pub item_id: ItemId,
    /// Plaid request identifier.
    #[serde(default)]
    pub request_id: Option<RequestId>,
}
