use crate::adapters::database::DbPool;
use crate::config::Config;
use crate::services::admin_service::AdminService;
use crate::services::audit_service::AuditService;
use crate::services::dispatch_service::DispatchService;
use crate::services::health_service::HealthService;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{
    Json, Router,
    routing::{get, post},
};
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod health;
pub mod messages;
pub mod middleware;
pub mod schemas;
pub mod views;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub dispatch_service: DispatchService,
    pub audit_service: AuditService,
    pub admin_service: AdminService,
    pub health_service: HealthService,
}

#[derive(Clone, Debug)]
pub struct MgmtState {
    pub health_service: HealthService,
}

#[derive(Debug)]
pub struct ServiceContainer {
    pub pool: DbPool,
    pub dispatch_service: DispatchService,
    pub audit_service: AuditService,
    pub admin_service: AdminService,
    pub health_service: HealthService,
}

/// Configures and returns the primary application router.
pub fn app_router(config: Config, services: ServiceContainer) -> Router {
    let state = AppState {
        config,
        dispatch_service: services.dispatch_service,
        audit_service: services.audit_service,
        admin_service: services.admin_service,
        health_service: services.health_service,
    };

    let api_routes = Router::new()
        .route("/send", post(messages::send_message))
        .route("/send/bulk", post(messages::send_bulk_message))
        .route("/health", get(messages::health_check));

    let admin_routes = Router::new()
        .route("/", get(admin::root))
        .route("/login", get(admin::login_page).post(admin::login))
        .route("/logout", get(admin::logout))
        .route("/dashboard", get(admin::dashboard))
        .route("/api/messages", get(admin::list_messages))
        .route("/api/stats", get(admin::stats));

    Router::new()
        .route("/", get(messages::index))
        .nest("/api", api_routes)
        .nest("/admin", admin_routes)
        .fallback(messages::not_found)
        .method_not_allowed_fallback(messages::not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::new(axum::http::HeaderName::from_static("x-request-id")))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(move |request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<tower_http::request_id::RequestId>()
                        .map(|id| id.header_value().to_str().unwrap_or_default())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                        let status = response.status();
                        tracing::Span::current().record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(
            axum::http::HeaderName::from_static("x-request-id"),
            middleware::MakeRequestUuidOrHeader,
        ))
        .with_state(state)
}

pub fn mgmt_router(state: MgmtState) -> Router {
    Router::new().route("/livez", get(health::livez)).route("/readyz", get(health::readyz)).with_state(state)
}

#[allow(clippy::needless_pass_by_value)]
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(schemas::messaging::ErrorResponse { success: false, error: "Internal server error".to_string() }),
    )
        .into_response()
}
