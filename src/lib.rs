//! Backend that brokers Plaid calls for a web client.
//!
//! The crate exposes a typed async [`client::PlaidClient`] for the three
//! Plaid endpoints the app needs (Link token creation, public token
//! exchange, transaction retrieval) and an axum [`server`] that fronts it
//! with a small JSON API.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
