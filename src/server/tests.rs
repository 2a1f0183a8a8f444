use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Datelike as _, Local};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use url::Url;
use wiremock::matchers::{any, body_partial_json, method, path};
use wiremock::{Mock, MockServer, Respond, ResponseTemplate};

use super::*;

/// Responds to Link token requests with a fresh token every time.
struct FreshLinkToken;

impl Respond for FreshLinkToken {
    fn respond(&self, _request: &wiremock::Request) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "link_token": format!("link-sandbox-{}", uuid::Uuid::new_v4()),
            "expiration": "2020-03-27T12:56:34Z",
            "request_id": "req-link"
        }))
    }
}

fn app_for(base_url: &str) -> Router {
    let client = PlaidClient::builder()
        .client_id("client-1")
        .secret(SecretString::from("secret-1".to_owned()))
        .base_url(base_url)
        .build()
        .unwrap();
    let redirect_uri = Url::parse("http://localhost:5000/").unwrap();
    router(AppState::new(client, redirect_uri))
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Mock upstream that fails the test if it is contacted at all.
async fn untouchable_upstream() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    server
}

fn transaction(id: &str, amount: f64) -> Value {
    json!({
        "transaction_id": id,
        "account_id": "acc-1",
        "amount": amount,
        "iso_currency_code": "USD",
        "category": ["Food and Drink", "Restaurants"],
        "category_id": "13005000",
        "date": "2024-02-01",
        "authorized_date": "2024-01-31",
        "name": "Tacos",
        "merchant_name": "Taco Place",
        "payment_channel": "in store",
        "pending": false
    })
}

#[tokio::test]
async fn exchange_without_public_token_is_rejected_locally() {
    let server = untouchable_upstream().await;
    let app = app_for(&server.uri());

    for body in [json!({}), json!({ "public_token": "" }), json!({ "public_token": null })] {
        let (status, json) = send(app.clone(), post_json("/exchange_public_token", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json,
            json!({ "success": false, "error": "public_token is required" })
        );
    }
}

#[tokio::test]
async fn transactions_without_access_token_is_rejected_locally() {
    let server = untouchable_upstream().await;
    let app = app_for(&server.uri());

    let (status, json) = send(app.clone(), post_json("/get_transactions", &json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        json!({ "success": false, "error": "access_token is required" })
    );

    let (status, json) = send(app, post_empty("/get_transactions")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "access_token is required");
}

#[tokio::test]
async fn malformed_body_is_rejected_locally() {
    let server = untouchable_upstream().await;
    let request = Request::builder()
        .method("POST")
        .uri("/exchange_public_token")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, json) = send(app_for(&server.uri()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .starts_with("invalid request body")
    );
}

#[tokio::test]
async fn exchange_returns_credential_pair() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/item/public_token/exchange"))
        .and(body_partial_json(json!({ "public_token": "public-good" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-sandbox-de3ce8ef",
            "item_id": "item-42",
            "request_id": "req-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = send(
        app_for(&server.uri()),
        post_json("/exchange_public_token", &json!({ "public_token": "public-good" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({
            "success": true,
            "access_token": "access-sandbox-de3ce8ef",
            "item_id": "item-42"
        })
    );
}

#[tokio::test]
async fn exchange_upstream_rejection_is_bad_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/item/public_token/exchange"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error_type": "INVALID_INPUT",
            "error_code": "INVALID_PUBLIC_TOKEN",
            "error_message": "provided public token is in an invalid format",
            "display_message": null,
            "request_id": "req-2"
        })))
        .mount(&server)
        .await;

    let (status, json) = send(
        app_for(&server.uri()),
        post_json("/exchange_public_token", &json!({ "public_token": "public-bad" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("INVALID_PUBLIC_TOKEN"));
    assert!(json.get("access_token").is_none());
}

#[tokio::test]
async fn transactions_are_projected_and_total_is_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/transactions/get"))
        .and(body_partial_json(json!({
            "access_token": "access-sandbox-1",
            "options": { "count": 100 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accounts": [],
            "transactions": [
                transaction("tx-1", 12.5),
                transaction("tx-2", -40.0),
                transaction("tx-3", 3.25)
            ],
            "total_transactions": 250,
            "item": { "item_id": "item-1", "institution_id": "ins_109508" },
            "request_id": "req-3"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = send(
        app_for(&server.uri()),
        post_json("/get_transactions", &json!({ "access_token": "access-sandbox-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["total_transactions"], 250);

    let transactions = json["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 3);
    for tx in transactions {
        let mut keys: Vec<&str> = tx.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["account_id", "amount", "category", "date", "id", "name"]);
    }
    assert_eq!(
        transactions[0],
        json!({
            "id": "tx-1",
            "amount": 12.5,
            "date": "2024-02-01",
            "name": "Tacos",
            "category": ["Food and Drink", "Restaurants"],
            "account_id": "acc-1"
        })
    );
}

#[tokio::test]
async fn transactions_query_covers_year_to_date() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/transactions/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transactions": [],
            "total_transactions": 0,
            "request_id": "req-4"
        })))
        .mount(&server)
        .await;

    let (status, _) = send(
        app_for(&server.uri()),
        post_json("/get_transactions", &json!({ "access_token": "access-sandbox-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = requests[0].body_json().unwrap();
    let today = Local::now().date_naive();
    assert_eq!(body["start_date"], format!("{}-01-01", today.year()));
    assert_eq!(body["end_date"], today.format("%Y-%m-%d").to_string());
}

#[tokio::test]
async fn link_token_requests_transactions_in_the_us() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/link/token/create"))
        .and(body_partial_json(json!({
            "client_name": "Pennywise",
            "language": "en",
            "products": ["transactions"],
            "country_codes": ["US"],
            "user": { "client_user_id": "user-id" },
            "redirect_uri": "http://localhost:5000/"
        })))
        .respond_with(FreshLinkToken)
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = send(app_for(&server.uri()), post_empty("/create_link_token")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(json["link_token"].as_str().unwrap().starts_with("link-sandbox-"));
    assert_eq!(json["expiration"], "2020-03-27T12:56:34Z");

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert!(body.get("institution_id").is_none());
}

#[tokio::test]
async fn amex_link_token_pins_institution() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/link/token/create"))
        .and(body_partial_json(json!({
            "products": ["transactions"],
            "country_codes": ["US"],
            "institution_id": "ins_amex"
        })))
        .respond_with(FreshLinkToken)
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = send(app_for(&server.uri()), post_empty("/create_link_token_amex")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
}

#[tokio::test]
async fn repeated_link_token_calls_are_independent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/link/token/create"))
        .respond_with(FreshLinkToken)
        .expect(2)
        .mount(&server)
        .await;
    let app = app_for(&server.uri());

    let (_, first) = send(app.clone(), post_empty("/create_link_token")).await;
    let (_, second) = send(app, post_empty("/create_link_token")).await;
    assert_ne!(first["link_token"], second["link_token"]);
}

#[tokio::test]
async fn unreachable_upstream_is_bad_request() {
    let (status, json) = send(app_for("http://127.0.0.1:1"), post_empty("/create_link_token")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().starts_with("HTTP error"));
}

#[tokio::test]
async fn index_is_served_without_valid_upstream_config() {
    let config = Config::from_lookup(|key| {
        (key == crate::config::BASE_URL_ENV).then(|| "http://127.0.0.1:1".to_owned())
    })
    .unwrap();
    assert!(!config.missing_credentials().is_empty());
    let state = AppState::from_config(&config);
    assert!(state.is_ready());
    let app = router(state);

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("Pennywise"));
}

/// Config lookup over a fixed set of pairs.
fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |key| {
        pairs
            .iter()
            .find(|&&(name, _)| name == key)
            .map(|&(_, value)| value.to_owned())
    }
}

/// `/` still serves while every JSON route reports `expected` in the
/// failure envelope.
async fn assert_served_but_misconfigured(state: AppState, expected: &str) {
    assert!(!state.is_ready());
    let app = router(state);

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    for uri in ["/create_link_token", "/create_link_token_amex"] {
        let (status, json) = send(app.clone(), post_empty(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        let error = json["error"].as_str().unwrap();
        assert!(error.contains(expected), "{uri}: {error}");
    }

    let (status, json) = send(
        app.clone(),
        post_json("/exchange_public_token", &json!({ "public_token": "public-good" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains(expected));

    let (status, json) = send(
        app,
        post_json("/get_transactions", &json!({ "access_token": "access-sandbox-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains(expected));
}

#[tokio::test]
async fn unknown_environment_still_serves_index() {
    let pairs = [(crate::config::ENVIRONMENT_ENV, "staging")];
    let state = AppState::from_config_result(Config::from_lookup(lookup(&pairs)));
    assert_served_but_misconfigured(state, "unknown Plaid environment `staging`").await;
}

#[tokio::test]
async fn malformed_redirect_uri_still_serves_index() {
    let pairs = [(crate::config::REDIRECT_URI_ENV, "not a url")];
    let state = AppState::from_config_result(Config::from_lookup(lookup(&pairs)));
    assert_served_but_misconfigured(state, crate::config::REDIRECT_URI_ENV).await;
}

#[tokio::test]
async fn secret_with_control_character_still_serves_index() {
    let pairs = [
        (crate::config::CLIENT_ID_ENV, "client-1"),
        (crate::config::SECRET_ENV, "sec\nret"),
    ];
    let config = Config::from_lookup(lookup(&pairs)).unwrap();
    assert_served_but_misconfigured(AppState::from_config(&config), "invalid secret").await;
}

#[tokio::test]
async fn misconfigured_state_still_validates_bodies_first() {
    let app = router(AppState::misconfigured("configuration error: unusable"));
    let (status, json) = send(app, post_json("/get_transactions", &json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        json!({ "success": false, "error": "access_token is required" })
    );
}

#[tokio::test]
async fn transactions_upstream_rejection_is_bad_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/transactions/get"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error_type": "INVALID_INPUT",
            "error_code": "INVALID_ACCESS_TOKEN",
            "error_message": "provided access token is in an invalid format",
            "display_message": null,
            "request_id": "req-5"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = send(
        app_for(&server.uri()),
        post_json("/get_transactions", &json!({ "access_token": "access-bad" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("INVALID_ACCESS_TOKEN"));
    assert!(json.get("transactions").is_none());
    assert!(json.get("total_transactions").is_none());
}

#[tokio::test]
async fn amex_link_token_upstream_rejection_is_bad_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/link/token/create"))
        .and(body_partial_json(json!({ "institution_id": "ins_amex" })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error_type": "INVALID_REQUEST",
            "error_code": "INVALID_FIELD",
            "error_message": "institution_id is not valid for this client",
            "display_message": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = send(app_for(&server.uri()), post_empty("/create_link_token_amex")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("INVALID_FIELD"));
    assert!(json.get("link_token").is_none());
}
