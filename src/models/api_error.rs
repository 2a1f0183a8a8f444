//! Plaid error object returned with non-success responses.

use serde::{Deserialize, Serialize};

use super::RequestId;

/// Error body Plaid sends with 4xx/5xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Broad category, e.g. `INVALID_INPUT`.
    pub error_type: String,
    /// Specific code, e.g. `INVALID_PUBLIC_TOKEN`.
    pub error_code: String,
    /// Developer-facing message.
    pub error_message: String,
    /// End-user-facing message, if any.
    #[serde(default)]
    pub display_message: Option<String>,
    /// Plaid request identifier.
    #[serde(default)]
    pub request_id: Option<RequestId>,
}
