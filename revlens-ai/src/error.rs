//! Error types for revlens-ai HTTP handlers

use crate::services::{ClassificationError, LoadError};
use crate::workflow::PipelineError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unreadable or invalid input table (400)
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Classifier service failed (502)
    #[error(transparent)]
    Classification(#[from] ClassificationError),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Request body over the configured limit (413)
    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Load(e) => ApiError::Load(e),
            PipelineError::Classification(e) => ApiError::Classification(e),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Load(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Classification(_) => StatusCode::BAD_GATEWAY,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Load(LoadError::Schema { .. }) => "SCHEMA_ERROR",
            ApiError::Load(_) => "INVALID_TABLE",
            ApiError::Classification(_) => "CLASSIFIER_ERROR",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        }));

        (self.status(), body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
