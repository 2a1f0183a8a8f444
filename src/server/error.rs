//! Handler error type and its JSON envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::{Envelope, Failure};
use crate::error::PlaidError;

/// Errors a handler can end with.
///
/// Every variant is reported to the caller the same way: status 400 with
/// `{"success": false, "error": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required body field was absent, `null` or empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The request body was not a JSON object of the expected shape.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// No upstream client could be built from the configuration.
    #[error("{0}")]
    Misconfigured(String),

    /// The upstream call failed.
    #[error(transparent)]
    Upstream(#[from] PlaidError),
}

impl ApiError {
    /// HTTP status reported for this error.
    #[inline]
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Short machine-readable kind, used in logs.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match *self {
            Self::MissingField(_) | Self::InvalidBody(_) => "validation",
            Self::Misconfigured(_) => "configuration",
            Self::Upstream(_) => "upstream",
        }
    }
}

impl IntoResponse for ApiError {
    #[inline]
    fn into_response(self) -> Response {
        match self {
            Self::MissingField(_) | Self::InvalidBody(_) => {
                tracing::debug!(kind = self.kind(), error = %self, "rejected request");
            }
            Self::Misconfigured(_) => {
                tracing::warn!(kind = self.kind(), error = %self, "no upstream configured");
            }
            Self::Upstream(_) => {
                tracing::warn!(kind = self.kind(), error = %self, "upstream call failed");
            }
        }
        let envelope = Envelope {
            success: false,
            body: Failure {
                error: self.to_string(),
            },
        };
        (self.status_code(), Json(envelope)).into_response()
    }
}
