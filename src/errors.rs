use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {message}")]
    BadRequest {
        code: &'static str,
        message: &'static str,
    },
    #[error("not found: {message}")]
    NotFound {
        code: &'static str,
        message: &'static str,
    },
    #[error("storage error: {cause}")]
    Storage {
        message: &'static str,
        cause: String,
    },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: &'static str) -> Self {
        Self::BadRequest { code, message }
    }

    pub fn not_found(code: &'static str, message: &'static str) -> Self {
        Self::NotFound { code, message }
    }

    /// `message` is what the caller sees; `cause` only reaches the server log.
    pub fn storage(message: &'static str, cause: impl Into<String>) -> Self {
        Self::Storage {
            message,
            cause: cause.into(),
        }
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, "not_found", code, message),
            Self::Storage { message, cause } => {
                tracing::error!(error = %cause, "request failed with storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "error",
                    "storage_error",
                    message,
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                status: kind.to_string(),
                code: code.to_string(),
                message: message.to_string(),
                details: json!({}),
            }),
        )
            .into_response()
    }
}
