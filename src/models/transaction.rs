//! Transaction retrieval models (`/transactions/get`).

use chrono::{Datelike as _, NaiveDate};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::{AccountId, ItemId, RequestId, TransactionId};

/// Maximum number of transactions fetched per call.
pub const TRANSACTIONS_PAGE_SIZE: u32 = 100;

/// Paging options of a `/transactions/get` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionsGetOptions {
    /// Number of transactions to return.
    pub count: u32,
    /// Number of transactions to skip.
    pub offset: u32,
}

impl Default for TransactionsGetOptions {
    #[inline]
    fn default() -> Self {
        Self {
            count: TRANSACTIONS_PAGE_SIZE,
            offset: 0,
        }
    }
}

/// Request body for `/transactions/get`.
#[derive(Debug, Serialize)]
pub struct TransactionsGetRequest {
    /// Credential of the Item to query.
    #[serde(with = "super::secret")]
    pub access_token: SecretString,
    /// First day of the range (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the range (inclusive).
    pub end_date: NaiveDate,
    /// Paging options.
    pub options: TransactionsGetOptions,
}

impl TransactionsGetRequest {
    /// Builds a request for everything from January 1st of `today`'s year
    /// up to `today`, limited to the first page.
    #[inline]
    #[must_use]
    pub fn year_to_date(access_token: SecretString, today: NaiveDate) -> Self {
        let start_date = NaiveDate::from_yo_opt(today.year(), 1).unwrap_or(today);
        Self {
            access_token,
            start_date,
            end_date: today,
            options: TransactionsGetOptions::default(),
        }
    }
}

/// A transaction as reported by Plaid.
///
/// Only the fields this service reads are modelled; the rest are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier.
    pub transaction_id: TransactionId,
    /// Account the transaction posted to.
    pub account_id: AccountId,
    /// Amount; positive values are money leaving the account.
    pub amount: f64,
    /// Posting date.
    pub date: NaiveDate,
    /// Merchant or description text.
    pub name: String,
    /// Category hierarchy, most general first.
    #[serde(default)]
    pub category: Option<Vec<String>>,
    /// ISO-4217 currency code.
    #[serde(default)]
    pub iso_currency_code: Option<String>,
    /// Cleaned-up merchant name.
    #[serde(default)]
    pub merchant_name: Option<String>,
    /// Whether the transaction is still pending.
    #[serde(default)]
    pub pending: bool,
}

/// Item metadata returned alongside transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Identifier of the Item.
    pub item_id: ItemId,
    /// Institution the Item is linked to.
    #[serde(default)]
    pub institution_id: Option<String>,
}

/// Response body of `/transactions/get`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionsGetResponse {
    /// One page of transactions.
    pub transactions: Vec<Transaction>,
    /// Total number of transactions in the requested range.
    pub total_transactions: u64,
    /// The queried Item.
    #[serde(default)]
    pub item: Option<Item>,
    /// Plaid request identifier.
    #[serde(default)]
    pub request_id: Option<RequestId>,
}

/// The six-field projection of a [`Transaction`] returned to web clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    /// Transaction identifier.
    pub id: TransactionId,
    /// Amount.
    pub amount: f64,
    /// Posting date.
    pub date: NaiveDate,
    /// Description text.
    pub name: String,
    /// Category hierarchy.
    pub category: Option<Vec<String>>,
    /// Account identifier.
    pub account_id: AccountId,
}

impl From<Transaction> for TransactionSummary {
    #[inline]
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.transaction_id,
            amount: tx.amount,
            date: tx.date,
            name: tx.name,
            category: tx.category,
            account_id: tx.account_id,
        }
    }
}
