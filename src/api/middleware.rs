use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::MergeError;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid SQL: {0}")]
    InvalidSql(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Merge error: {0}")]
    Merge(String),

    #[error("Result too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorDetail {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match self {
            AppError::InvalidSql(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("INVALID_SQL", msg)
                    .with_details("Only a single SELECT statement can be merged."),
            ),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", msg),
            ),
            AppError::Merge(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new("MERGE_ERROR", msg),
            ),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorDetail::new("RESULT_TOO_LARGE", msg)
                    .with_details("Add pagination to the statement or raise MERGE_MAX_ROWS."),
            ),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorDetail::new("INTERNAL_ERROR", msg),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_detail,
        });

        (status, body).into_response()
    }
}

impl From<MergeError> for AppError {
    fn from(err: MergeError) -> Self {
        match err {
            MergeError::InvalidSql(_) | MergeError::UnsupportedStatement(_) => {
                AppError::InvalidSql(err.to_string())
            }
            MergeError::UnsupportedDatabaseType(_) => AppError::Validation(err.to_string()),
            MergeError::RowLimitExceeded { .. } => AppError::PayloadTooLarge(err.to_string()),
            MergeError::ParameterIndexOutOfRange { .. }
            | MergeError::InvalidParameter { .. }
            | MergeError::ColumnIndexOutOfRange { .. }
            | MergeError::NoCurrentRow => AppError::Merge(err.to_string()),
        }
    }
}
