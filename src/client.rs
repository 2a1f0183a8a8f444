//! Async HTTP client for the Plaid API.
//!
//! Only the three endpoints the gateway brokers are exposed. Credentials
//! travel as default headers marked sensitive, so they never show up in
//! `Debug` output of the client.

use core::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret as _, SecretString};

use crate::error::{PlaidError, Result};
use crate::models::{
    Environment, ErrorBody, LinkTokenCreateRequest, LinkTokenCreateResponse,
    PublicTokenExchangeRequest, PublicTokenExchangeResponse, TransactionsGetRequest,
    TransactionsGetResponse,
};

/// Timeout applied to every outbound call unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Link token creation endpoint path.
const LINK_TOKEN_CREATE_PATH: &str = "/link/token/create";

/// Public token exchange endpoint path.
const PUBLIC_TOKEN_EXCHANGE_PATH: &str = "/item/public_token/exchange";

/// Transactions endpoint path.
const TRANSACTIONS_GET_PATH: &str = "/transactions/get";

/// Header carrying the client id.
const CLIENT_ID_HEADER: &str = "plaid-client-id";

/// Header carrying the secret.
const SECRET_HEADER: &str = "plaid-secret";

/// Builder for constructing a [`PlaidClient`].
#[derive(Debug)]
pub struct PlaidClientBuilder {
    /// Plaid client id.
    client_id: Option<String>,
    /// Plaid secret for the selected environment.
    secret: Option<SecretString>,
    /// Deployment tier.
    environment: Environment,
    /// Base URL override (for testing).
    base_url: Option<String>,
    /// Outbound request timeout.
    timeout: Duration,
}

impl PlaidClientBuilder {
    /// Sets the Plaid client id.
    #[inline]
    #[must_use]
    pub fn client_id<T: Into<String>>(mut self, client_id: T) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Sets the Plaid secret.
    #[inline]
    #[must_use]
    pub fn secret(mut self, secret: SecretString) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Selects the deployment tier (defaults to sandbox).
    #[inline]
    #[must_use]
    pub const fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Overrides the base URL (useful for testing with a mock server).
    #[inline]
    #[must_use]
    pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Overrides the outbound request timeout.
    #[inline]
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`PlaidError::Config`] if the client id or secret was not
    /// provided or cannot be sent as a header value.
    /// Returns [`PlaidError::Http`] if the HTTP client fails to build.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub fn build(self) -> Result<PlaidClient> {
        let client_id = self
            .client_id
            .ok_or_else(|| PlaidError::Config("client id is required".to_owned()))?;
        let secret = self
            .secret
            .ok_or_else(|| PlaidError::Config("secret is required".to_owned()))?;
        let base_url = self
            .base_url
            .unwrap_or_else(|| self.environment.base_url().to_owned())
            .trim_end_matches('/')
            .to_owned();

        let client_id_value = HeaderValue::from_str(&client_id)
            .map_err(|err| PlaidError::Config(format!("invalid client id: {err}")))?;
        let mut secret_value = HeaderValue::from_str(secret.expose_secret())
            .map_err(|err| PlaidError::Config(format!("invalid secret: {err}")))?;
        secret_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.extend([
            (HeaderName::from_static(CLIENT_ID_HEADER), client_id_value),
            (HeaderName::from_static(SECRET_HEADER), secret_value),
        ]);

        tracing::debug!(
            base_url = %base_url,
            environment = %self.environment,
            timeout = ?self.timeout,
            "building Plaid client"
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .build()?;

        Ok(PlaidClient { http, base_url })
    }
}

/// Async client for the Plaid API.
///
/// Use [`PlaidClient::builder()`] to construct an instance.
#[derive(Debug, Clone)]
pub struct PlaidClient {
    /// Underlying HTTP client, with credentials as default headers.
    http: reqwest::Client,
    /// API base URL without a trailing slash.
    base_url: String,
}

impl PlaidClient {
    /// Creates a new builder for configuring the client.
    #[inline]
    #[must_use]
    pub const fn builder() -> PlaidClientBuilder {
        PlaidClientBuilder {
            client_id: None,
            secret: None,
            environment: Environment::Sandbox,
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Returns the base URL requests are sent to.
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates a Link token via `/link/token/create`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, Plaid returns a
    /// non-success status, or the response cannot be deserialized.
    #[inline]
    #[tracing::instrument(skip_all, fields(institution = ?request.institution_id))]
    pub async fn link_token_create(
        &self,
        request: &LinkTokenCreateRequest,
    ) -> Result<LinkTokenCreateResponse> {
        tracing::debug!("creating link token");
        self.post_json(LINK_TOKEN_CREATE_PATH, request).await
    }

    /// Exchanges a public token for an access token via
    /// `/item/public_token/exchange`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, Plaid returns a
    /// non-success status, or the response cannot be deserialized.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub async fn item_public_token_exchange(
        &self,
        request: &PublicTokenExchangeRequest,
    ) -> Result<PublicTokenExchangeResponse> {
        tracing::debug!("exchanging public token");
        self.post_json(PUBLIC_TOKEN_EXCHANGE_PATH, request).await
    }

    /// Fetches one page of transactions via `/transactions/get`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, Plaid returns a
    /// non-success status, or the response cannot be deserialized.
    #[inline]
    #[tracing::instrument(
        skip_all,
        fields(start = %request.start_date, end = %request.end_date, count = request.options.count)
    )]
    pub async fn transactions_get(
        &self,
        request: &TransactionsGetRequest,
    ) -> Result<TransactionsGetResponse> {
        tracing::debug!("fetching transactions");
        self.post_json(TRANSACTIONS_GET_PATH, request).await
    }

    /// Sends a JSON POST request and deserializes the response.
    #[tracing::instrument(skip_all, fields(path = %path))]
    async fn post_json<Req: serde::Serialize + Sync, Resp: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<Resp> {
        let url = format!("{}{path}", self.base_url);
        tracing::trace!(url = %url, "sending POST request");
        let response = self.http.post(&url).json(body).send().await?;

        Self::handle_response(response).await
    }

    /// Handles an HTTP response, checking status and deserializing the body.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        tracing::debug!(status = %status, "received response");
        if status.is_success() {
            let body = response.text().await?;
            tracing::trace!(body_len = body.len(), "parsing response body");
            serde_json::from_str(&body).map_err(PlaidError::from)
        } else {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_owned());
            let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => (body.error_code, body.error_message),
                Err(_) => ("UNKNOWN".to_owned(), text),
            };
            tracing::debug!(status = status.as_u16(), code = %code, "API error");
            Err(PlaidError::Api {
                status: status.as_u16(),
                code,
                message,
            })
        }
    }
}
