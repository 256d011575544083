use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::llm_client::LlmError;
use crate::ranking::validation::ValidationError;
use crate::similarity::EmbeddingError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Invalid LLM response: {message}")]
    InvalidLlmResponse { message: String, raw: String },

    #[error("LLM response does not match schema: {message}")]
    SchemaMismatch { message: String, raw: String },

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, raw) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg, None),
            AppError::MissingInput(msg) => (StatusCode::BAD_REQUEST, "MISSING_INPUT", msg, None),
            AppError::UnsupportedFormat(ext) => (
                StatusCode::BAD_REQUEST,
                "UNSUPPORTED_FORMAT",
                format!("Unsupported file type: {ext}. Upload a PDF, DOCX or DOC file."),
                None,
            ),
            AppError::EmptyInput(msg) => (StatusCode::BAD_REQUEST, "EMPTY_INPUT", msg, None),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg,
                None,
            ),
            AppError::InvalidLlmResponse { message, raw } => {
                tracing::error!("Invalid JSON from LLM: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INVALID_LLM_RESPONSE",
                    format!("Invalid JSON from LLM: {message}"),
                    Some(raw),
                )
            }
            AppError::SchemaMismatch { message, raw } => {
                tracing::error!("LLM schema mismatch: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SCHEMA_MISMATCH",
                    format!("LLM response does not match the ranking schema: {message}"),
                    Some(raw),
                )
            }
            AppError::ExternalService(msg) => {
                tracing::error!("External service error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXTERNAL_SERVICE_ERROR",
                    msg,
                    None,
                )
            }
            AppError::Timeout(limit) => {
                let millis = limit.as_millis();
                tracing::error!("Request timed out after {millis}ms");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "TIMEOUT",
                    format!("Request did not complete within {millis}ms"),
                    None,
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({
            "error": {
                "code": code,
                "message": message
            }
        });
        if let Some(raw) = raw {
            body["raw"] = json!(raw);
        }

        (status, Json(body)).into_response()
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::UnsupportedFormat { extension } => {
                AppError::UnsupportedFormat(extension)
            }
            ExtractionError::Empty { .. } => AppError::EmptyInput(err.to_string()),
            ExtractionError::Io(e) => AppError::Internal(anyhow::Error::new(e)),
            ExtractionError::Pdf { .. }
            | ExtractionError::Docx { .. }
            | ExtractionError::Conversion { .. } => AppError::UnprocessableEntity(err.to_string()),
        }
    }
}

impl From<EmbeddingError> for AppError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::EmptyInput => AppError::EmptyInput(err.to_string()),
            other => AppError::ExternalService(format!("Embedding service: {other}")),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        AppError::ExternalService(format!("LLM service: {err}"))
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidJson { reason, raw } => AppError::InvalidLlmResponse {
                message: reason,
                raw,
            },
            ValidationError::SchemaMismatch { reason, raw } => AppError::SchemaMismatch {
                message: reason,
                raw,
            },
        }
    }
}
