//! API Error Types
//!
//! Maps executor and domain errors onto HTTP status codes:
//! not-found lookups are 404, failed state or precondition checks are 409,
//! input validation is 400, and calculator or store defects are 500. The
//! stable domain code (`JIA-APPR-002` and friends) rides along in the
//! response body when one exists.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jia_core::JiaError;
use jia_executor::ExecutorError;
use serde::Serialize;
use thiserror::Error;

/// API-specific errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Validation error
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Resource not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },

    /// Internal error
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// Executor error
    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Error code; the domain code when the error carries one
    pub code: String,
    /// Error message
    pub message: String,
}

impl ApiError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        ApiError::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal {
            message: message.into(),
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Executor(err) => executor_status(err),
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> String {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR".to_string(),
            ApiError::NotFound { .. } => "NOT_FOUND".to_string(),
            ApiError::Internal { .. } => "INTERNAL_ERROR".to_string(),
            ApiError::Executor(err) => match err.code() {
                Some(code) => code.to_string(),
                None => match executor_status(err) {
                    StatusCode::NOT_FOUND => "NOT_FOUND".to_string(),
                    StatusCode::CONFLICT => "CONFLICT".to_string(),
                    StatusCode::BAD_REQUEST => "VALIDATION_ERROR".to_string(),
                    _ => "INTERNAL_ERROR".to_string(),
                },
            },
        }
    }
}

fn executor_status(err: &ExecutorError) -> StatusCode {
    match err {
        ExecutorError::NotFound { .. } => StatusCode::NOT_FOUND,
        ExecutorError::Duplicate { .. } => StatusCode::CONFLICT,
        ExecutorError::Registry(_) | ExecutorError::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        ExecutorError::Domain(domain) => match domain {
            JiaError::NotFound { .. } => StatusCode::NOT_FOUND,
            // Bad input, not bad state
            JiaError::InvalidAmount { .. }
            | JiaError::InvalidWorkingInterest { .. }
            | JiaError::CategoryEstimateMismatch { .. }
            | JiaError::CategoryNotInAfe { .. }
            | JiaError::EmptyCycle
            | JiaError::NonPositiveCallTotal { .. }
            | JiaError::NoParties { .. } => StatusCode::BAD_REQUEST,
            // Calculator defect, never expected on valid input
            JiaError::AllocationRounding { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            // Everything else is a precondition or sequencing failure
            _ => StatusCode::CONFLICT,
        },
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.error_code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
