//! Exercises `GraphClient` against a local stub of the Graph API.

use std::collections::HashMap;
use std::time::Duration;

use assert_matches::assert_matches;
use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use waba_core::onboarding::GraphApi;
use waba_graph::{GraphApiError, GraphClient, GraphConfig};

const TOKEN: &str = "EAAG-stub-token";

fn bearer_ok(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": { "message": "Invalid OAuth access token.", "code": 190 } })),
    )
}

async fn access_token(Form(form): Form<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    let valid = form.get("client_id").map(String::as_str) == Some("app-id")
        && form.get("client_secret").map(String::as_str) == Some("app-secret")
        && form.get("grant_type").map(String::as_str) == Some("authorization_code");
    if !valid {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "message": "Invalid client credentials." } })),
        );
    }
    match form.get("code").map(String::as_str) {
        Some("good-code") => (
            StatusCode::OK,
            Json(json!({ "access_token": TOKEN, "token_type": "bearer" })),
        ),
        Some("tokenless") => (StatusCode::OK, Json(json!({ "token_type": "bearer" }))),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "message": "Invalid verification code format." } })),
        ),
    }
}

async fn node(
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    match query.get("fields").map(String::as_str) {
        Some("is_on_biz_app,platform_type") => (
            StatusCode::OK,
            Json(json!({ "id": id, "is_on_biz_app": true, "platform_type": "CLOUD_API" })),
        ),
        Some("name") => (StatusCode::OK, Json(json!({ "id": id, "name": "Acme Support" }))),
        _ => (StatusCode::BAD_REQUEST, Json(json!({ "error": {} }))),
    }
}

async fn register(
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    let ok = id == "106540352242922"
        && body["messaging_product"] == "whatsapp"
        && body["pin"] == "123456";
    (StatusCode::OK, Json(json!({ "success": ok })))
}

async fn subscribed_apps(Path(id): Path<String>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    if id == "broken" {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!("upstream exploded")));
    }
    (StatusCode::OK, Json(json!({ "success": true })))
}

async fn spawn_stub() -> String {
    let app = Router::new()
        .route("/v23.0/oauth/access_token", post(access_token))
        .route("/v23.0/{id}", get(node))
        .route("/v23.0/{id}/register", post(register))
        .route("/v23.0/{id}/subscribed_apps", post(subscribed_apps));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base_url: String) -> GraphClient {
    GraphClient::new(&GraphConfig {
        base_url,
        api_version: "v23.0".into(),
        client_id: "app-id".into(),
        client_secret: SecretString::from("app-secret"),
        request_timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn token() -> SecretString {
    SecretString::from(TOKEN)
}

#[tokio::test]
async fn exchange_code_posts_form_credentials() {
    let graph = client(spawn_stub().await);

    let grant = graph.exchange_code("good-code").await.unwrap();
    assert_eq!(grant.access_token.unwrap().expose_secret(), TOKEN);

    let grant = graph.exchange_code("tokenless").await.unwrap();
    assert!(grant.access_token.is_none());
}

#[tokio::test]
async fn exchange_code_surfaces_envelope_message() {
    let graph = client(spawn_stub().await);

    let err = graph.exchange_code("bad-code").await.unwrap_err();
    assert_matches!(
        err,
        GraphApiError::Api { status: 400, ref message }
            if message == "Invalid verification code format."
    );
}

#[tokio::test]
async fn number_status_and_account_name_use_field_selection() {
    let graph = client(spawn_stub().await);

    let status = graph.get_number_status("106540352242922", &token()).await.unwrap();
    assert_eq!(status.is_on_biz_app, Some(true));
    assert_eq!(status.platform_type.as_deref(), Some("CLOUD_API"));
    assert!(status.is_coexisting());

    let account = graph.get_account_name("220114961174211", &token()).await.unwrap();
    assert_eq!(account.name.as_deref(), Some("Acme Support"));
}

#[tokio::test]
async fn register_sends_messaging_product_and_pin() {
    let graph = client(spawn_stub().await);

    let ack = graph
        .register_number("106540352242922", &token(), &SecretString::from("123456"))
        .await
        .unwrap();
    assert!(ack.success);

    let ack = graph
        .register_number("106540352242922", &token(), &SecretString::from("000000"))
        .await
        .unwrap();
    assert!(!ack.success);
}

#[tokio::test]
async fn subscribe_reports_success_and_raw_error_bodies() {
    let graph = client(spawn_stub().await);

    assert!(graph.subscribe_webhooks("220114961174211", &token()).await.unwrap().success);

    let err = graph.subscribe_webhooks("broken", &token()).await.unwrap_err();
    assert_matches!(
        err,
        GraphApiError::Api { status: 500, ref message } if message == "\"upstream exploded\""
    );
}

#[tokio::test]
async fn wrong_token_is_rejected() {
    let graph = client(spawn_stub().await);

    let err = graph
        .get_account_name("220114961174211", &SecretString::from("EAAG-other"))
        .await
        .unwrap_err();
    assert_matches!(err, GraphApiError::Api { status: 401, .. });
}

#[tokio::test]
async fn unreachable_host_is_a_request_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let graph = client(format!("http://{addr}"));
    let err = graph.exchange_code("good-code").await.unwrap_err();
    assert_matches!(err, GraphApiError::Request(_));
}

#[tokio::test]
async fn transport_errors_do_not_leak_identifiers() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let graph = client(format!("http://{addr}"));
    let phone_err = graph
        .get_number_status("106540352242922", &token())
        .await
        .unwrap_err();
    let waba_err = graph
        .subscribe_webhooks("220114961174211", &token())
        .await
        .unwrap_err();

    for (err, id) in [(phone_err, "106540352242922"), (waba_err, "220114961174211")] {
        let mut chain = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(inner) = source {
            chain.push_str(&inner.to_string());
            source = inner.source();
        }
        assert!(!chain.contains(id), "{chain}");
    }
}
