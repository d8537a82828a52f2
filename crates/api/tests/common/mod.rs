#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::routing::{get as route_get, post};
use axum::{Json, Router};
use chrono::Utc;
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use waba_api::config::ServerConfig;
use waba_api::router::build_app_router;
use waba_api::state::AppState;
use waba_core::onboarding::{ConfiguredPolicy, OnboardingConfig, OnboardingOrchestrator};
use waba_db::models::wa_configuration::{CreatePendingConfiguration, WaConfiguration};
use waba_db::repositories::WaConfigurationRepo;
use waba_db::PgSessionStore;
use waba_graph::{GraphClient, GraphConfig};

pub const ACCESS_TOKEN: &str = "EAAG-test-access-token";
pub const WABA_NAME: &str = "Acme Support";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: String::new(),
        db_max_connections: 5,
    }
}

// ---------------------------------------------------------------------------
// Graph API stub
// ---------------------------------------------------------------------------

/// How the stub Graph API answers.
#[derive(Debug, Clone, Default)]
pub struct GraphBehaviour {
    pub on_biz_app: bool,
    pub register_success: bool,
    pub subscribe_success: bool,
    /// Step tag whose call answers with an error envelope.
    pub fail_step: Option<&'static str>,
}

impl GraphBehaviour {
    /// A number that needs registering, with every call succeeding.
    pub fn cloud_api() -> Self {
        Self {
            on_biz_app: false,
            register_success: true,
            subscribe_success: true,
            fail_step: None,
        }
    }

    /// A number already on the business app and the Cloud API.
    pub fn coexistence() -> Self {
        Self {
            on_biz_app: true,
            ..Self::cloud_api()
        }
    }

    pub fn failing_at(step: &'static str) -> Self {
        Self {
            fail_step: Some(step),
            ..Self::cloud_api()
        }
    }
}

#[derive(Clone)]
struct StubState {
    behaviour: GraphBehaviour,
    exchange_calls: Arc<AtomicUsize>,
    register_calls: Arc<AtomicUsize>,
}

impl StubState {
    fn fails(&self, step: &str) -> Option<(StatusCode, Json<Value>)> {
        (self.behaviour.fail_step == Some(step)).then(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": { "message": format!("stub failure at {step}"), "code": 100 }
                })),
            )
        })
    }
}

/// A running stub with counters for the calls that matter to assertions.
pub struct GraphStub {
    pub base_url: String,
    pub exchange_calls: Arc<AtomicUsize>,
    pub register_calls: Arc<AtomicUsize>,
}

impl GraphStub {
    pub fn exchanges(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn registrations(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }
}

async fn stub_access_token(State(stub): State<StubState>) -> (StatusCode, Json<Value>) {
    stub.exchange_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(failure) = stub.fails("exchange_code") {
        return failure;
    }
    (
        StatusCode::OK,
        Json(json!({ "access_token": ACCESS_TOKEN, "token_type": "bearer" })),
    )
}

async fn stub_node(
    State(stub): State<StubState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if query.get("fields").map(String::as_str) == Some("name") {
        if let Some(failure) = stub.fails("waba_name") {
            return failure;
        }
        return (StatusCode::OK, Json(json!({ "id": id, "name": WABA_NAME })));
    }

    if let Some(failure) = stub.fails("verify_number") {
        return failure;
    }
    (
        StatusCode::OK,
        Json(json!({
            "id": id,
            "is_on_biz_app": stub.behaviour.on_biz_app,
            "platform_type": if stub.behaviour.on_biz_app { "CLOUD_API" } else { "NOT_APPLICABLE" },
        })),
    )
}

async fn stub_register(State(stub): State<StubState>) -> (StatusCode, Json<Value>) {
    stub.register_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(failure) = stub.fails("register_number") {
        return failure;
    }
    (StatusCode::OK, Json(json!({ "success": stub.behaviour.register_success })))
}

async fn stub_subscribe(State(stub): State<StubState>) -> (StatusCode, Json<Value>) {
    if let Some(failure) = stub.fails("subscribe_apps") {
        return failure;
    }
    (StatusCode::OK, Json(json!({ "success": stub.behaviour.subscribe_success })))
}

/// Serve a stub Graph API on an ephemeral local port.
pub async fn spawn_graph_stub(behaviour: GraphBehaviour) -> GraphStub {
    let state = StubState {
        behaviour,
        exchange_calls: Arc::new(AtomicUsize::new(0)),
        register_calls: Arc::new(AtomicUsize::new(0)),
    };
    let stub = GraphStub {
        base_url: String::new(),
        exchange_calls: Arc::clone(&state.exchange_calls),
        register_calls: Arc::clone(&state.register_calls),
    };

    let app = Router::new()
        .route("/v23.0/oauth/access_token", post(stub_access_token))
        .route("/v23.0/{id}", route_get(stub_node))
        .route("/v23.0/{id}/register", post(stub_register))
        .route("/v23.0/{id}/subscribed_apps", post(stub_subscribe))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    GraphStub {
        base_url: format!("http://{addr}"),
        ..stub
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// Build the full application router against the given Graph API base URL
/// and optional admin whitelist.
pub fn build_app_with(pool: PgPool, graph_base_url: &str, whitelist: Option<&str>) -> Router {
    let config = test_config();

    let graph = GraphClient::new(&GraphConfig {
        base_url: graph_base_url.to_string(),
        api_version: "v23.0".to_string(),
        client_id: "test-app".to_string(),
        client_secret: SecretString::from("test-secret"),
        request_timeout: Duration::from_secs(5),
    })
    .unwrap();

    let orchestrator = OnboardingOrchestrator::new(
        PgSessionStore::new(pool.clone()),
        graph,
        ConfiguredPolicy::from_whitelist(whitelist),
        OnboardingConfig {
            register_pin: SecretString::from("123456"),
        },
    );

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        onboarding: Arc::new(orchestrator),
    };

    build_app_router(state, &config)
}

/// Build the application for tests that never reach the Graph API.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_with(pool, "http://127.0.0.1:9", None)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a pending configuration expiring in one hour.
pub async fn seed_pending(pool: &PgPool, user_id: i64, token: &str) -> WaConfiguration {
    seed_pending_with_ttl(pool, user_id, token, chrono::Duration::hours(1)).await
}

pub async fn seed_pending_with_ttl(
    pool: &PgPool,
    user_id: i64,
    token: &str,
    ttl: chrono::Duration,
) -> WaConfiguration {
    WaConfigurationRepo::create_pending(
        pool,
        &CreatePendingConfiguration {
            user_id,
            onboarding_session: token.to_string(),
            onboarding_expires_at: Utc::now() + ttl,
        },
    )
    .await
    .unwrap()
}

pub async fn reload(pool: &PgPool, id: i64) -> WaConfiguration {
    WaConfigurationRepo::find_by_id(pool, id).await.unwrap().unwrap()
}

/// A complete request body for `token`.
pub fn completion_body(token: &str, phone_number_id: &str) -> Value {
    json!({
        "session": token,
        "code": "AQD-auth-code",
        "phone_number_id": phone_number_id,
        "waba_id": "220114961174211",
    })
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub fn post_json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> Response {
    app.oneshot(post_json_request(uri, body)).await.unwrap()
}
