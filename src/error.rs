use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::conflict::{Conflict, ConflictKind};
use crate::models::TimeError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(Conflict),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Generator error: {0}")]
    Generator(String),

    #[error("Busy: {0}")]
    Busy(String),

    #[error("Internal server error")]
    InternalServerError,
}

impl From<TimeError> for AppError {
    fn from(err: TimeError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<Conflict> for AppError {
    fn from(conflict: Conflict) -> Self {
        AppError::Conflict(conflict)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ConflictKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_entry_id: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut conflict_detail = None;
        let (status, error_message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Conflict(conflict) => {
                let msg = format!("Timetable conflict: {}", conflict);
                conflict_detail = Some(conflict);
                (StatusCode::CONFLICT, msg)
            }
            AppError::Busy(msg) => (StatusCode::CONFLICT, msg),
            AppError::Network(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Generator(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
            kind: conflict_detail.as_ref().map(|c| c.kind),
            with_entry_id: conflict_detail.and_then(|c| c.with_entry_id),
        });

        (status, body).into_response()
    }
}
