use crate::api::MgmtState;
use crate::api::schemas::health::HealthResponse;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

/// Liveness probe: returns 200 OK as long as the server is running.
pub async fn livez() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness probe: the relay is ready only when both the database and the gateway answer.
pub async fn readyz(State(state): State<MgmtState>) -> impl IntoResponse {
    let (db_res, gateway_res) = tokio::join!(state.health_service.check_db(), state.health_service.check_gateway());

    let response = readiness(component_status("database", db_res), component_status("gateway", gateway_res));
    let status_code = if response.status == "ok" { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    (status_code, Json(response))
}

fn component_status(component: &'static str, result: Result<(), String>) -> &'static str {
    match result {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, component, "Readiness check failed");
            "error"
        }
    }
}

fn readiness(database: &str, gateway: &str) -> HealthResponse {
    let overall = if [database, gateway].iter().all(|s| *s == "ok") { "ok" } else { "error" };
    HealthResponse { status: overall.to_string(), database: database.to_string(), gateway: gateway.to_string() }
}
