use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::identity::IdentityError;
use crate::llm_client::LlmError;
use crate::resume::extractor::ExtractionError;

/// Shown to callers alongside a 503 so they know a retry is worthwhile.
pub const OVERLOAD_RETRY_HINT: &str = "The AI service is busy. Please try again in a few moments.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Extraction error: {0}")]
    Extraction(ExtractionError),

    #[error("LLM overloaded: {0}")]
    Overloaded(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Identity provider error: {0}")]
    Identity(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        if err.is_overloaded() {
            AppError::Overloaded(err.to_string())
        } else {
            AppError::Llm(err.to_string())
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::MissingFile => AppError::Validation(err.to_string()),
            other => AppError::Extraction(other),
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidToken(msg) => AppError::Unauthorized(msg),
            IdentityError::Rejected(msg) => AppError::Validation(msg),
            other => AppError::Identity(other.to_string()),
        }
    }
}

/// Unwraps a required, non-blank request field.
pub fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{field} is required"))),
    }
}

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<&'static str>,
}

impl AppError {
    /// Attaches the debug chain as `details` when `expose_details` is set.
    pub fn reported(self, expose_details: bool) -> ReportedError {
        ReportedError {
            error: self,
            expose_details,
        }
    }

    fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        let body = |error, message: String| ErrorBody {
            error,
            message,
            details: None,
            retry: None,
        };

        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                body("Invalid request", msg.clone()),
            ),
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                body("Unauthorized", msg.clone()),
            ),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                body("Payload too large", msg.clone()),
            ),
            AppError::Extraction(e) => {
                tracing::error!("Extraction error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    body("PDF extraction failed", e.to_string()),
                )
            }
            AppError::Overloaded(msg) => {
                tracing::error!("LLM overloaded: {msg}");
                let mut b = body(
                    "AI service overloaded",
                    "The AI model is currently overloaded".to_string(),
                );
                b.retry = Some(OVERLOAD_RETRY_HINT);
                (StatusCode::SERVICE_UNAVAILABLE, b)
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    body(
                        "AI generation failed",
                        "An AI processing error occurred".to_string(),
                    ),
                )
            }
            AppError::Identity(msg) => {
                tracing::error!("Identity provider error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    body(
                        "Identity provider error",
                        "The identity provider request failed".to_string(),
                    ),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    body("Database error", "A database error occurred".to_string()),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    body(
                        "Internal server error",
                        "An internal server error occurred".to_string(),
                    ),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.reported(false).into_response()
    }
}

/// An `AppError` rendered with or without diagnostic details.
#[derive(Debug)]
pub struct ReportedError {
    error: AppError,
    expose_details: bool,
}

impl IntoResponse for ReportedError {
    fn into_response(self) -> Response {
        let (status, mut body) = self.error.status_and_body();
        if self.expose_details && status.is_server_error() {
            body.details = Some(format!("{:?}", self.error));
        }
        (status, Json(body)).into_response()
    }
}
