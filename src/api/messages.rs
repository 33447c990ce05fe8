use crate::api::AppState;
use crate::api::middleware::ApiJson;
use crate::api::schemas::messaging::{ErrorResponse, SendBulkMessage, SendMessage, SendResponse, ServiceDescriptor};
use crate::error::{AppError, Result};
use crate::services::validation;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Describes the service and its public endpoints.
pub async fn index() -> impl IntoResponse {
    Json(ServiceDescriptor::current())
}

/// Sends a message to a single recipient.
///
/// # Errors
/// Returns `AppError::Validation` for malformed input and `AppError::Gateway` if the gateway call fails.
pub async fn send_message(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SendMessage>,
) -> Result<impl IntoResponse> {
    let request = validation::validate_single(payload.phone_number.as_ref(), payload.message.as_ref())
        .map_err(AppError::Validation)?;

    let receipt = state.dispatch_service.dispatch(request).await?;

    Ok(Json(SendResponse { success: true, message: "Message sent successfully".to_string(), data: receipt.payload }))
}

/// Sends one message to many recipients with a single gateway call.
///
/// # Errors
/// Returns `AppError::Validation` for malformed input and `AppError::Gateway` if the gateway call fails.
pub async fn send_bulk_message(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SendBulkMessage>,
) -> Result<impl IntoResponse> {
    let request = validation::validate_bulk(payload.phone_numbers.as_ref(), payload.message.as_ref())
        .map_err(AppError::Validation)?;

    let receipt = state.dispatch_service.dispatch(request).await?;

    Ok(Json(SendResponse {
        success: true,
        message: format!("Message sent to {} recipients", receipt.recipients),
        data: receipt.payload,
    }))
}

/// Reports whether the messaging gateway is reachable.
pub async fn health_check(State(state): State<AppState>) -> Response {
    match state.health_service.gateway_status().await {
        Ok(data) => Json(SendResponse {
            success: true,
            message: "Signal CLI REST API is available".to_string(),
            data,
        })
        .into_response(),
        Err(e) => {
            (StatusCode::SERVICE_UNAVAILABLE, Json(ErrorResponse { success: false, error: e.to_string() })).into_response()
        }
    }
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}
