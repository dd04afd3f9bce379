//! Error handling for the agricultural monitoring server
//!
//! Client mistakes (bad coordinates, dates, ranges) map to 400; imagery
//! provider failures map to 502 so callers can tell them apart from a
//! successful analysis that found no usable pixels.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{DateRangeError, GeometryError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Client errors
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(#[from] DateRangeError),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // Imagery provider errors
    #[error("Imagery provider error: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    /// HTTP status and body for this error
    pub fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::InvalidGeometry(err) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_GEOMETRY".to_string(),
                    message: err.to_string(),
                    field: err.field().map(str::to_string),
                },
            ),
            AppError::InvalidDateRange(err) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_DATE_RANGE".to_string(),
                    message: err.to_string(),
                    field: Some(err.field().to_string()),
                },
            ),
            AppError::InvalidRange(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_RANGE".to_string(),
                    message: msg.clone(),
                    field: None,
                },
            ),
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: errors.to_string(),
                    field: errors.field_errors().keys().next().map(|f| f.to_string()),
                },
            ),
            AppError::Provider(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "PROVIDER_ERROR".to_string(),
                    message: format!("Imagery provider error: {}", msg),
                    field: None,
                },
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "CONFIGURATION_ERROR".to_string(),
                    message: format!("Configuration error: {}", msg),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred".to_string(),
                    field: None,
                },
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.status_and_detail();

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
