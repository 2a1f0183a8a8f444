//! Error types for the Plaid client and configuration layer.

/// All errors that can occur when talking to the Plaid API.
#[derive(Debug, thiserror::Error)]
pub enum PlaidError {
    /// HTTP transport failed (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Plaid API error (status {status}, {code}): {message}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
        /// Plaid error code, e.g. `INVALID_PUBLIC_TOKEN`.
        code: String,
        /// Human-readable error message.
        message: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, PlaidError>;
