//! Enumeration types for constrained API values.

use serde::{Deserialize, Serialize};

use crate::error::PlaidError;

/// Plaid product a Link session is initialised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    /// Transaction history.
    Transactions,
    /// Account and routing numbers.
    Auth,
    /// Real-time balances.
    Balance,
    /// Account holder identity.
    Identity,
    /// Investment holdings.
    Investments,
    /// Loan and credit card liabilities.
    Liabilities,
}

/// ISO-3166-1 alpha-2 country code accepted by Link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CountryCode {
    /// United States.
    Us,
    /// Canada.
    Ca,
    /// United Kingdom.
    Gb,
    /// Ireland.
    Ie,
    /// France.
    Fr,
    /// Spain.
    Es,
    /// Netherlands.
    Nl,
}

/// Plaid deployment tier the client talks to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Test environment with fake institutions and credentials.
    #[default]
    Sandbox,
    /// Limited live environment.
    Development,
    /// Live environment.
    Production,
}

impl Environment {
    /// Returns the API base URL for this tier.
    #[inline]
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => "https://sandbox.plaid.com",
            Self::Development => "https://development.plaid.com",
            Self::Production => "https://production.plaid.com",
        }
    }

    /// Returns the lowercase tier name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl core::fmt::Display for Environment {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Environment {
    type Err = PlaidError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(PlaidError::Config(format!(
                "unknown Plaid environment `{other}` (expected sandbox, development or production)"
            ))),
        }
    }
}
