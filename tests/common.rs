#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use relay_server::adapters::database::{self, DbPool};
use relay_server::api::{self, MgmtState};
use relay_server::config::{
    AdminConfig, Config, DatabaseConfig, GatewayConfig, HealthConfig, LogFormat, ServerConfig, TelemetryConfig,
};
use relay_server::AppBuilder;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex, Once};
use tokio::net::TcpListener;

pub const SENDER_NUMBER: &str = "+15550000000";
pub const ADMIN_EMAIL: &str = "ops@example.com";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("relay_server=debug".parse().unwrap())
            .add_directive("sqlx=warn".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
    });
}

/// How the fake Signal CLI REST API answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GatewayMode {
    /// `201` with a timestamp payload.
    Accept,
    /// `400` with an `error` field.
    Reject,
    /// `500` with a non-JSON body.
    RejectWithoutReason,
    /// Sends are accepted but `/v1/about` answers `503`.
    Degraded,
}

#[derive(Debug)]
struct FakeGatewayState {
    mode: Mutex<GatewayMode>,
    sends: Mutex<Vec<Value>>,
}

/// In-process stand-in for the Signal CLI REST API that records every send.
#[derive(Clone, Debug)]
pub struct FakeGateway {
    pub url: String,
    state: Arc<FakeGatewayState>,
}

impl FakeGateway {
    pub async fn spawn() -> Self {
        let state = Arc::new(FakeGatewayState { mode: Mutex::new(GatewayMode::Accept), sends: Mutex::new(Vec::new()) });

        let app = Router::new()
            .route("/v2/send", post(fake_send))
            .route("/v1/about", get(fake_about))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { url: format!("http://{addr}"), state }
    }

    pub fn set_mode(&self, mode: GatewayMode) {
        *self.state.mode.lock().unwrap() = mode;
    }

    pub fn sends(&self) -> Vec<Value> {
        self.state.sends.lock().unwrap().clone()
    }
}

async fn fake_send(State(state): State<Arc<FakeGatewayState>>, Json(payload): Json<Value>) -> Response {
    state.sends.lock().unwrap().push(payload);
    let mode = *state.mode.lock().unwrap();
    match mode {
        GatewayMode::Accept | GatewayMode::Degraded => {
            (StatusCode::CREATED, Json(json!({ "timestamp": "1700000000000" }))).into_response()
        }
        GatewayMode::Reject => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid recipient" }))).into_response()
        }
        GatewayMode::RejectWithoutReason => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
    }
}

async fn fake_about(State(state): State<Arc<FakeGatewayState>>) -> Response {
    let mode = *state.mode.lock().unwrap();
    if mode == GatewayMode::Degraded {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    Json(json!({ "versions": ["v1", "v2"], "mode": "json" })).into_response()
}

/// A URL on which nothing is listening.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn get_test_config(gateway_url: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            mgmt_port: 0,
            shutdown_timeout_secs: 1,
        },
        database: DatabaseConfig { url: "sqlite::memory:".to_string(), max_connections: 1, acquire_timeout_secs: 2 },
        gateway: GatewayConfig { base_url: gateway_url.to_string(), sender_number: SENDER_NUMBER.to_string() },
        admin: AdminConfig {
            email: Some(ADMIN_EMAIL.to_string()),
            password: Some(ADMIN_PASSWORD.to_string()),
            session_ttl_secs: 3600,
            secure_cookie: false,
        },
        health: HealthConfig { db_timeout_ms: 1000, gateway_timeout_ms: 1000 },
        telemetry: TelemetryConfig { log_level: "info".to_string(), log_format: LogFormat::Text, otlp_endpoint: None },
    }
}

#[derive(Debug)]
pub struct TestApp {
    pub server_url: String,
    pub mgmt_url: String,
    pub client: reqwest::Client,
    pub pool: DbPool,
    pub gateway: FakeGateway,
    pub config: Config,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let gateway = FakeGateway::spawn().await;
        let config = get_test_config(&gateway.url);
        Self::spawn_with_config(config, gateway).await
    }

    /// Spawns the relay pointed at a gateway address that refuses connections.
    pub async fn spawn_unreachable() -> Self {
        let gateway = FakeGateway::spawn().await;
        let config = get_test_config(&unreachable_url().await);
        Self::spawn_with_config(config, gateway).await
    }

    pub async fn spawn_with_config(config: Config, gateway: FakeGateway) -> Self {
        setup_tracing();

        let pool = database::init_pool(&config.database).await.expect("Failed to open in-memory database");
        relay_server::run_migrations(&pool).await.expect("Failed to run migrations");

        let app = AppBuilder::new(config.clone()).with_database(pool.clone()).build().await.unwrap();

        let app_router = api::app_router(config.clone(), app.services);
        let mgmt_router = api::mgmt_router(MgmtState { health_service: app.health_service });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app_router).await.unwrap();
        });

        let mgmt_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mgmt_url = format!("http://{}", mgmt_listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(mgmt_listener, mgmt_router).await.unwrap();
        });

        let client = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none()).build().unwrap();

        Self { server_url, mgmt_url, client, pool, gateway, config }
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client.post(format!("{}{path}", self.server_url)).json(body).send().await.unwrap()
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(format!("{}{path}", self.server_url)).send().await.unwrap()
    }

    pub async fn get_with_cookie(&self, path: &str, cookie: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.server_url))
            .header(reqwest::header::COOKIE, cookie)
            .send()
            .await
            .unwrap()
    }

    pub async fn submit_login(&self, email: &str, password: &str) -> reqwest::Response {
        let form = format!("email={}&password={}", email.replace('@', "%40"), password);
        self.client
            .post(format!("{}/admin/login", self.server_url))
            .header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await
            .unwrap()
    }

    /// Logs in as the bootstrap admin and returns a `Cookie` header value.
    pub async fn login(&self) -> String {
        let resp = self.submit_login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);

        let set_cookie = resp.headers().get(reqwest::header::SET_COOKIE).unwrap().to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    /// `(phone_number, message, status)` for every audit row, oldest first.
    pub async fn audit_rows(&self) -> Vec<(String, String, String)> {
        sqlx::query_as("SELECT phone_number, message, status FROM messages ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .unwrap()
    }
}
