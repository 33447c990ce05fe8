use crate::domain::message::FieldViolation;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldViolation>),
    #[error("Gateway error: {0}")]
    Gateway(String),
    #[error("Authentication failed")]
    AuthError,
    #[error("Not found")]
    NotFound,
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalMsg(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(violations) => {
                tracing::debug!(count = violations.len(), "Validation failed");
                let body = Json(json!({
                    "success": false,
                    "errors": violations,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            Self::Gateway(msg) => {
                tracing::warn!(error = %msg, "Gateway error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            Self::Database(e) => {
                tracing::error!(error = %e, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            Self::AuthError => {
                tracing::debug!("Authentication failed");
                (StatusCode::UNAUTHORIZED, "Unauthorized. Please login.".to_string())
            }
            Self::NotFound => {
                tracing::debug!("Resource not found");
                (StatusCode::NOT_FOUND, "Endpoint not found".to_string())
            }
            Self::BadRequest(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, msg)
            }
            Self::Internal => {
                tracing::error!("Internal server error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            Self::InternalMsg(msg) => {
                tracing::error!(message = %msg, "Internal server error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}
