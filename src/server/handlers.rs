//! Route handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::Html;
use chrono::{DateTime, Local, Utc};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{AMEX_INSTITUTION_ID, ApiError, AppState, Envelope};
use crate::models::{
    InstitutionId, ItemId, PublicTokenExchangeRequest, TransactionSummary, TransactionsGetRequest,
};

/// Landing page, compiled into the binary.
const INDEX_HTML: &str = include_str!("../../templates/index.html");

/// Result type of the JSON routes.
type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

/// Body of `/exchange_public_token`.
#[derive(Debug, Default, Deserialize)]
struct ExchangeParams {
    /// One-time token from Link.
    #[serde(default)]
    public_token: Option<String>,
}

/// Body of `/get_transactions`.
#[derive(Debug, Default, Deserialize)]
struct TransactionsParams {
    /// Credential of the Item to query.
    #[serde(default)]
    access_token: Option<String>,
}

/// Payload of the Link token routes.
#[derive(Debug, Serialize)]
pub(super) struct LinkTokenPayload {
    /// Token to initialise Link with.
    link_token: String,
    /// When the token expires.
    expiration: DateTime<Utc>,
}

/// Payload of `/exchange_public_token`.
#[derive(Debug, Serialize)]
pub(super) struct ExchangePayload {
    /// Durable credential; the caller stores it.
    #[serde(serialize_with = "crate::models::secret::serialize")]
    access_token: SecretString,
    /// Identifier of the linked Item.
    item_id: ItemId,
}

/// Payload of `/get_transactions`.
#[derive(Debug, Serialize)]
pub(super) struct TransactionsPayload {
    /// First page of transactions, projected.
    transactions: Vec<TransactionSummary>,
    /// Upstream count for the whole date range.
    total_transactions: u64,
}

/// `GET /`
pub(super) async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `POST /create_link_token`
pub(super) async fn create_link_token(
    State(state): State<AppState>,
) -> ApiResult<LinkTokenPayload> {
    link_token(&state, None).await
}

/// `POST /create_link_token_amex`
pub(super) async fn create_link_token_amex(
    State(state): State<AppState>,
) -> ApiResult<LinkTokenPayload> {
    link_token(&state, Some(InstitutionId::from(AMEX_INSTITUTION_ID))).await
}

/// `POST /exchange_public_token`
pub(super) async fn exchange_public_token(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<ExchangePayload> {
    let params: ExchangeParams = parse_body(&body)?;
    let public_token = required(params.public_token, "public_token")?;

    let response = state
        .upstream()?
        .client
        .item_public_token_exchange(&PublicTokenExchangeRequest { public_token })
        .await?;
    tracing::info!(item_id = %response.item_id, "public token exchanged");

    Ok(Json(Envelope::ok(ExchangePayload {
        access_token: response.access_token,
        item_id: response.item_id,
    })))
}

/// `POST /get_transactions`
///
/// Returns the first page only; `total_transactions` is the upstream count
/// for the whole range and may be larger than the page.
pub(super) async fn get_transactions(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<TransactionsPayload> {
    let params: TransactionsParams = parse_body(&body)?;
    let access_token = required(params.access_token, "access_token")?;

    let upstream = state.upstream()?;

    let request = TransactionsGetRequest::year_to_date(access_token, Local::now().date_naive());
    let response = upstream.client.transactions_get(&request).await?;
    tracing::debug!(
        returned = response.transactions.len(),
        total = response.total_transactions,
        "transactions fetched"
    );

    Ok(Json(Envelope::ok(TransactionsPayload {
        transactions: response
            .transactions
            .into_iter()
            .map(TransactionSummary::from)
            .collect(),
        total_transactions: response.total_transactions,
    })))
}

/// Creates a Link token, optionally pinned to one institution.
async fn link_token(
    state: &AppState,
    institution_id: Option<InstitutionId>,
) -> ApiResult<LinkTokenPayload> {
    let upstream = state.upstream()?;
    let request = upstream.link_token_request(institution_id);
    let response = upstream.client.link_token_create(&request).await?;
    tracing::debug!(expiration = %response.expiration, "link token created");

    Ok(Json(Envelope::ok(LinkTokenPayload {
        link_token: response.link_token,
        expiration: response.expiration,
    })))
}

/// Parses a JSON body, treating an empty body as `{}`.
fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|err| ApiError::InvalidBody(err.to_string()))
}

/// Wraps a non-empty field value as a secret.
fn required(value: Option<String>, field: &'static str) -> Result<SecretString, ApiError> {
    value
        .filter(|token| !token.is_empty())
        .map(SecretString::from)
        .ok_or(ApiError::MissingField(field))
}
