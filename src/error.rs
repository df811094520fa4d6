use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::domain::WaitlistStatus;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Already on waitlist as {waitlist_id} ({status:?})")]
    DuplicateActiveEntry {
        waitlist_id: String,
        status: WaitlistStatus,
    },

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Payment link creation failed: {0}")]
    PaymentLink(String),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref msg) => {
                tracing::error!("Database error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error occurred")
            }
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.as_str()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Invalid or missing API key"),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::Validation(ref msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.as_str()),
            // Carries the existing entry so callers can branch on it
            // instead of re-querying.
            AppError::DuplicateActiveEntry { ref waitlist_id, ref status } => {
                let body = Json(json!({
                    "error": "Customer already on waitlist for this date",
                    "waitlist_id": waitlist_id,
                    "status": status,
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::InvalidTransition(ref msg) => (StatusCode::CONFLICT, msg.as_str()),
            AppError::InvalidAmount(ref msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.as_str()),
            AppError::PaymentLink(ref msg) => {
                tracing::error!("Payment link creation failed: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.as_str())
            }
            AppError::Notification(ref msg) => {
                tracing::error!("Notification failed: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.as_str())
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}
