//! Environment-driven configuration.
//!
//! [`Config`] is read once at startup and handed to the server; nothing
//! is reconfigured at runtime.

use core::time::Duration;

use secrecy::{ExposeSecret as _, SecretString};
use url::Url;

use crate::client::{DEFAULT_TIMEOUT, PlaidClient};
use crate::error::{PlaidError, Result};
use crate::models::Environment;

/// Environment variable holding the Plaid client id.
pub const CLIENT_ID_ENV: &str = "PLAID_CLIENT_ID";

/// Environment variable holding the Plaid secret.
pub const SECRET_ENV: &str = "PLAID_SECRET";

/// Environment variable selecting the deployment tier.
pub const ENVIRONMENT_ENV: &str = "PLAID_ENV";

/// Environment variable holding the OAuth redirect URI.
pub const REDIRECT_URI_ENV: &str = "PLAID_REDIRECT_URI";

/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "PLAID_BASE_URL";

/// Environment variable holding the outbound timeout in seconds.
pub const TIMEOUT_ENV: &str = "PLAID_TIMEOUT_SECS";

/// Redirect URI used when none is configured.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:5000/";

/// Settings for the upstream client and the Link flow.
#[derive(Debug)]
pub struct Config {
    /// Plaid client id; empty when not configured.
    pub client_id: String,
    /// Plaid secret; empty when not configured.
    pub secret: SecretString,
    /// Deployment tier.
    pub environment: Environment,
    /// Base URL override, mostly for pointing at a mock server.
    pub base_url: Option<String>,
    /// OAuth redirect URI sent with every Link token request.
    pub redirect_uri: Url,
    /// Timeout for each outbound call.
    pub timeout: Duration,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`PlaidError::Config`] if a variable is set to an invalid
    /// value.
    #[inline]
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, treating empty values as
    /// unset.
    ///
    /// # Errors
    ///
    /// Returns [`PlaidError::Config`] if the environment tier is unknown,
    /// the redirect URI is not a URL, or the timeout is not a positive
    /// number of seconds.
    #[inline]
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let environment = get(ENVIRONMENT_ENV)
            .map(|value| value.parse::<Environment>())
            .transpose()?
            .unwrap_or_default();

        let redirect_raw = get(REDIRECT_URI_ENV).unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_owned());
        let redirect_uri = Url::parse(&redirect_raw)
            .map_err(|err| PlaidError::Config(format!("{REDIRECT_URI_ENV}: {err}")))?;

        let timeout = match get(TIMEOUT_ENV) {
            Some(value) => parse_timeout(&value)?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            client_id: get(CLIENT_ID_ENV).unwrap_or_default(),
            secret: SecretString::from(get(SECRET_ENV).unwrap_or_default()),
            environment,
            base_url: get(BASE_URL_ENV),
            redirect_uri,
            timeout,
        })
    }

    /// Returns the names of credential variables that are not set.
    #[inline]
    #[must_use]
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.client_id.is_empty() {
            missing.push(CLIENT_ID_ENV);
        }
        if self.secret.expose_secret().is_empty() {
            missing.push(SECRET_ENV);
        }
        missing
    }

    /// Builds the upstream client described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials cannot be used as header values
    /// or the HTTP client fails to build.
    #[inline]
    pub fn plaid_client(&self) -> Result<PlaidClient> {
        let builder = PlaidClient::builder()
            .client_id(self.client_id.as_str())
            .secret(SecretString::from(self.secret.expose_secret().to_owned()))
            .environment(self.environment)
            .timeout(self.timeout);
        match self.base_url.as_deref() {
            Some(url) => builder.base_url(url).build(),
            None => builder.build(),
        }
    }
}

/// Parses a positive whole number of seconds.
fn parse_timeout(value: &str) -> Result<Duration> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(PlaidError::Config(format!("{TIMEOUT_ENV}: must be positive"))),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(err) => Err(PlaidError::Config(format!("{TIMEOUT_ENV}: {err}"))),
    }
}
