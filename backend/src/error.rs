//! Error handling for the Vaccine Inventory Management Platform
//!
//! Every failure leaves the API as `{"error": {"code", "message", ...}}`.
//! Validation failures carry the per-field map, partial writes carry the
//! per-lot batch report.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::FieldErrors;
use thiserror::Error;

/// Which write of a lot's create-then-update pair failed
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WriteStage {
    Create,
    Update,
}

/// A lot whose writes did not complete
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LotFailure {
    pub lot_id: i64,
    pub inventory_id: String,
    pub stage: WriteStage,
    pub message: String,
}

/// Per-lot outcome of a multi-lot write
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub operation: String,
    /// Lots whose create and update both succeeded
    pub succeeded: Vec<i64>,
    pub failed: Vec<LotFailure>,
}

impl BatchReport {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            ..Self::default()
        }
    }

    /// True when at least one write reached the store
    pub fn wrote_anything(&self) -> bool {
        !self.succeeded.is_empty() || self.failed.iter().any(|f| f.stage == WriteStage::Update)
    }
}

impl std::fmt::Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} lot(s) written, {} lot(s) failed",
            self.operation,
            self.succeeded.len(),
            self.failed.len()
        )
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] FieldErrors),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Record store error: {0}")]
    Collaborator(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Partial write: {0}")]
    PartialWrite(BatchReport),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Store failures may succeed on a later attempt; nothing else will
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Collaborator(_) | AppError::DatabaseError(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(FieldErrors::single(field, message))
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<BatchReport>,
    pub retryable: bool,
}

impl ErrorDetail {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            fields: None,
            batch: None,
            retryable: false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    fields: Some(fields.clone()),
                    ..ErrorDetail::new("VALIDATION_ERROR", "Please correct the highlighted fields")
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::Collaborator(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    retryable: true,
                    ..ErrorDetail::new("COLLABORATOR_ERROR", format!("Record store error: {}", msg))
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    retryable: true,
                    ..ErrorDetail::new("COLLABORATOR_ERROR", "A database error occurred")
                },
            ),
            AppError::PartialWrite(report) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    batch: Some(report.clone()),
                    ..ErrorDetail::new(
                        "PARTIAL_WRITE",
                        format!("Some records were not saved. {}", report),
                    )
                },
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred"),
            ),
        };

        if status.is_server_error() || status == StatusCode::CONFLICT {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
