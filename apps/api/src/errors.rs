use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::dialogue::DialogueError;
use crate::document::DocumentError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("An interview session is already in progress")]
    SessionInProgress,

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Extraction parse error: {0}")]
    ExtractionParse(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Dialogue error: {0}")]
    Dialogue(#[from] DialogueError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::SessionInProgress => (
                StatusCode::CONFLICT,
                "SESSION_IN_PROGRESS",
                self.to_string(),
            ),
            AppError::Document(e) => {
                tracing::warn!("Document error: {e}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "DOCUMENT_ERROR",
                    "The uploaded file could not be read as a PDF".to_string(),
                )
            }
            AppError::ExtractionParse(msg) => {
                tracing::error!("Extraction parse error: {msg}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXTRACTION_PARSE_ERROR",
                    "The resume could not be structured; the session has stopped".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Dialogue(DialogueError::AttemptsExhausted { slot, attempts }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "DIALOGUE_EXHAUSTED",
                format!("No valid {slot} was captured after {attempts} attempts"),
            ),
            AppError::Dialogue(e) => {
                tracing::error!("Dialogue error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DIALOGUE_ERROR",
                    "The voice interview failed".to_string(),
                )
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Your answers could not be saved".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
