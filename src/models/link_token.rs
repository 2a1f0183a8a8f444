//! Link token creation models (`/link/token/create`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{CountryCode, InstitutionId, Product, RequestId};

/// End user a Link session is created for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTokenUser {
    /// Stable identifier of the user in the calling application.
    pub client_user_id: String,
}

/// Request body for `/link/token/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTokenCreateRequest {
    /// Application name shown inside Link.
    pub client_name: String,
    /// Display language (`en`, `fr`, ...).
    pub language: String,
    /// Countries whose institutions are offered.
    pub country_codes: Vec<CountryCode>,
    /// End user of the session.
    pub user: LinkTokenUser,
    /// Products to initialise.
    pub products: Vec<Product>,
    /// OAuth redirect URI registered with Plaid.
    pub redirect_uri: Url,
    /// Restricts Link to a single institution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution_id: Option<InstitutionId>,
}

/// Response body of `/link/token/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTokenCreateResponse {
    /// Token to initialise Link with.
    pub link_token: String,
    /// When the token stops being accepted.
    pub expiration: DateTime<Utc>,
    /// Plaid request identifier.
    #[serde(default)]
    pub request_id: Option<RequestId>,
}
