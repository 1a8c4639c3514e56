use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::clients::responder::ResponderError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Session not found")]
    SessionNotFound,

    #[error("It is not your turn")]
    OutOfTurn,

    #[error("Invalid piece")]
    InvalidPiece,

    #[error(transparent)]
    Responder(#[from] ResponderError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::SessionNotFound => {
                (StatusCode::NOT_FOUND, "Session not found".to_string())
            }
            AppError::OutOfTurn => (StatusCode::CONFLICT, "It is not your turn".to_string()),
            AppError::InvalidPiece => (StatusCode::BAD_REQUEST, "Invalid piece".to_string()),
            AppError::Responder(e) => {
                tracing::warn!("Responder failure: {e}");
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Anyhow(e) => {
                tracing::error!("Unexpected error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}
