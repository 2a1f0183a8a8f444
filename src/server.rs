//! HTTP gateway in front of the Plaid client.
//!
//! Every route answers with a JSON envelope: `{"success": true, ...}` on
//! success and `{"success": false, "error": "..."}` with status 400 on any
//! failure. Handlers share an immutable [`AppState`] and make exactly one
//! upstream call each.

mod error;
mod handlers;
#[cfg(test)]
mod tests;

use axum::Router;
use axum::routing::{get, post};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use url::Url;

pub use error::ApiError;

use crate::client::PlaidClient;
use crate::config::Config;
use crate::models::{
    CountryCode, InstitutionId, LinkTokenCreateRequest, LinkTokenUser, Product,
};

/// Application name shown inside Link.
pub const CLIENT_NAME: &str = "Pennywise";

/// Link display language.
pub const LANGUAGE: &str = "en";

/// End-user identifier sent with every Link token request.
pub const CLIENT_USER_ID: &str = "user-id";

/// Institution the Amex Link route is pinned to.
pub const AMEX_INSTITUTION_ID: &str = "ins_amex";

/// A usable upstream: the client plus the Link redirect URI.
#[derive(Debug, Clone)]
pub(crate) struct Upstream {
    /// Upstream client.
    pub(crate) client: PlaidClient,
    /// OAuth redirect URI for Link.
    redirect_uri: Url,
}

impl Upstream {
    /// Builds a Link token request for the transactions product in the US,
    /// optionally pinned to one institution.
    pub(crate) fn link_token_request(
        &self,
        institution_id: Option<InstitutionId>,
    ) -> LinkTokenCreateRequest {
        LinkTokenCreateRequest {
            client_name: CLIENT_NAME.to_owned(),
            language: LANGUAGE.to_owned(),
            country_codes: vec![CountryCode::Us],
            user: LinkTokenUser {
                client_user_id: CLIENT_USER_ID.to_owned(),
            },
            products: vec![Product::Transactions],
            redirect_uri: self.redirect_uri.clone(),
            institution_id,
        }
    }
}

/// State shared by all handlers.
///
/// Holds either a ready upstream or the reason there is none. A broken
/// configuration never stops the server: `/` keeps serving and the JSON
/// routes answer with the usual 400 envelope carrying the reason.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Upstream, or the configuration error that prevented building it.
    upstream: Result<Upstream, String>,
}

impl AppState {
    /// Creates the state from an already built client.
    #[inline]
    #[must_use]
    pub const fn new(client: PlaidClient, redirect_uri: Url) -> Self {
        Self {
            upstream: Ok(Upstream {
                client,
                redirect_uri,
            }),
        }
    }

    /// Creates a state without an upstream; every JSON route fails with
    /// `reason`.
    #[inline]
    #[must_use]
    pub fn misconfigured(reason: impl Into<String>) -> Self {
        Self {
            upstream: Err(reason.into()),
        }
    }

    /// Builds the client described by `config` and wraps it in state.
    ///
    /// A client that cannot be built (say, a credential that is not a valid
    /// header value) is logged and yields a misconfigured state.
    #[inline]
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        match config.plaid_client() {
            Ok(client) => Self::new(client, config.redirect_uri.clone()),
            Err(err) => {
                tracing::error!(error = %err, "failed to build Plaid client");
                Self::misconfigured(err.to_string())
            }
        }
    }

    /// Like [`AppState::from_config`], but also accepts the result of
    /// loading the configuration, so a load error is served instead of
    /// stopping the process.
    #[inline]
    #[must_use]
    pub fn from_config_result(config: crate::error::Result<Config>) -> Self {
        match config {
            Ok(config) => Self::from_config(&config),
            Err(err) => {
                tracing::error!(error = %err, "invalid configuration");
                Self::misconfigured(err.to_string())
            }
        }
    }

    /// Whether an upstream client is available.
    #[inline]
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.upstream.is_ok()
    }

    /// The upstream, or [`ApiError::Misconfigured`] when there is none.
    pub(crate) fn upstream(&self) -> Result<&Upstream, ApiError> {
        self.upstream
            .as_ref()
            .map_err(|reason| ApiError::Misconfigured(reason.clone()))
    }
}

/// Uniform response envelope.
#[derive(Debug, Serialize)]
pub(crate) struct Envelope<T> {
    /// Whether the call succeeded.
    success: bool,
    /// Route-specific payload, flattened into the envelope.
    #[serde(flatten)]
    body: T,
}

impl<T> Envelope<T> {
    /// Wraps a successful payload.
    pub(crate) const fn ok(body: T) -> Self {
        Self {
            success: true,
            body,
        }
    }
}

/// Payload of a failed call.
#[derive(Debug, Serialize)]
pub(crate) struct Failure {
    /// Human-readable error message.
    error: String,
}

/// Builds the router with all routes and request tracing.
#[inline]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/create_link_token", post(handlers::create_link_token))
        .route(
            "/create_link_token_amex",
            post(handlers::create_link_token_amex),
        )
        .route(
            "/exchange_public_token",
            post(handlers::exchange_public_token),
        )
        .route("/get_transactions", post(handlers::get_transactions))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the gateway on `listener` until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the listener fails.
#[inline]
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

/// Resolves when the process is asked to stop.
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("received Ctrl-C, shutting down"),
            Err(err) => {
                tracing::warn!(error = %err, "failed to listen for Ctrl-C");
                core::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                if stream.recv().await.is_some() {
                    tracing::info!("received SIGTERM, shutting down");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to listen for SIGTERM");
                core::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = core::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
