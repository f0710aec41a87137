use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Public error vocabulary of the diary service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Invalid {
        message: String,
        details: Vec<String>,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unknown(String),

    #[error("{0}")]
    Timeout(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "ERR_INVALID")]
    Invalid,
    #[serde(rename = "ERR_NOT_FOUND")]
    NotFound,
    #[serde(rename = "ERR_CONFLICT")]
    Conflict,
    #[serde(rename = "ERR_UNKNOWN")]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: ErrorCode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl AppError {
    pub fn invalid(message: impl Into<String>, details: Vec<String>) -> Self {
        AppError::Invalid {
            message: message.into(),
            details,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Invalid { .. } => ErrorCode::Invalid,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::Unknown(_) | AppError::Timeout(_) => ErrorCode::Unknown,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Invalid { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = self.to_string();
        let details = match self {
            AppError::Invalid { details, .. } => details,
            _ => Vec::new(),
        };

        tracing::warn!(
            status  = status.as_u16(),
            code    = ?code,
            details = ?details,
            "Service error: {message}"
        );

        let body = ErrorResponse {
            message,
            code,
            details,
        };
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
