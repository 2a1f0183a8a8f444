//! Data models for the Plaid endpoints this service brokers.
//!
//! Request and response bodies for link-token creation, public token
//! exchange and transaction retrieval, plus newtype ID wrappers and
//! enumeration types for constrained values. Token fields are held in
//! [`secrecy::SecretString`].

mod api_error;
mod enums;
mod ids;
mod item;
mod link_token;
pub(crate) mod secret;
mod transaction;

pub use api_error::ErrorBody;
pub use chrono::NaiveDate;
pub use enums::{CountryCode, Environment, Product};
pub use ids::{AccountId, InstitutionId, ItemId, RequestId, TransactionId};
pub use item::{PublicTokenExchangeRequest, PublicTokenExchangeResponse};
pub use link_token::{LinkTokenCreateRequest, LinkTokenCreateResponse, LinkTokenUser};
pub use transaction::{
    Item, TRANSACTIONS_PAGE_SIZE, Transaction, TransactionSummary, TransactionsGetOptions,
    TransactionsGetRequest, TransactionsGetResponse,
};
