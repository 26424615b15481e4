//! Uniform error envelope.
//!
//! Validation problems come back as 422; everything else collapses to a
//! generic 500 so no internal detail leaks to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::json;
use thiserror::Error;

use care_gaps::CareGapError;
use care_governance::audit::AuditError;
use care_governance::phase_gates::GateError;
use care_risk::ReadmissionError;
use care_summary::SummarizationError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }
}

impl From<CareGapError> for ApiError {
    fn from(err: CareGapError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<ReadmissionError> for ApiError {
    fn from(err: ReadmissionError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<SummarizationError> for ApiError {
    fn from(err: SummarizationError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<AuditError> for ApiError {
    fn from(err: AuditError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<care_governance::cost::CostError> for ApiError {
    fn from(err: care_governance::cost::CostError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "validation_failed",
                    "message": message,
                    "timestamp": Utc::now(),
                })),
            )
                .into_response(),
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "unhandled_error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error",
                        "message": "An unexpected error occurred",
                        "timestamp": Utc::now(),
                    })),
                )
                    .into_response()
            }
        }
    }
}
