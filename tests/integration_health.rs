#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, clippy::must_use_candidate, missing_debug_implementations, unreachable_pub)]
use axum::http::StatusCode;
use common::{GatewayMode, TestApp};
use serde_json::{Value, json};

mod common;

#[tokio::test]
async fn test_gateway_health_available() {
    let app = TestApp::spawn().await;

    let resp = app.get("/api/health").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Signal CLI REST API is available");
    assert_eq!(body["data"]["mode"], "json");
}

#[tokio::test]
async fn test_gateway_health_unavailable() {
    let app = TestApp::spawn().await;
    app.gateway.set_mode(GatewayMode::Degraded);

    let resp = app.get("/api/health").await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "success": false, "error": "Signal CLI REST API is not available" }));
}

#[tokio::test]
async fn test_gateway_health_unreachable() {
    let app = TestApp::spawn_unreachable().await;

    let resp = app.get("/api/health").await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_livez() {
    let app = TestApp::spawn().await;

    let resp = app.client.get(format!("{}/livez", app.mgmt_url)).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readyz_happy_path() {
    let app = TestApp::spawn().await;

    let resp = app.client.get(format!("{}/readyz", app.mgmt_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
    assert_eq!(body["gateway"], "ok");
}

#[tokio::test]
async fn test_readyz_gateway_error() {
    let app = TestApp::spawn().await;
    app.gateway.set_mode(GatewayMode::Degraded);

    let resp = app.client.get(format!("{}/readyz", app.mgmt_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["database"], "ok");
    assert_eq!(body["gateway"], "error");
}

#[tokio::test]
async fn test_readyz_database_error() {
    let app = TestApp::spawn().await;

    // Close the pool to simulate a database outage
    app.pool.close().await;

    let resp = app.client.get(format!("{}/readyz", app.mgmt_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["database"], "error");
    assert_eq!(body["gateway"], "ok");
}
