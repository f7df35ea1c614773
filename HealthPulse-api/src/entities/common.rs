use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use health_pulse_domain::services::{MetricServiceError, ProfileServiceError};

/// Error response format for API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a not found error response
    pub fn not_found(resource: &str) -> Self {
        Self {
            error: "not_found".to_string(),
            message: format!("The requested {} could not be found", resource),
            details: None,
        }
    }

    /// Create a validation error response
    pub fn validation_error(message: &str, details: Option<serde_json::Value>) -> Self {
        Self {
            error: "validation_error".to_string(),
            message: message.to_string(),
            details,
        }
    }

    /// Create a bad request error response
    pub fn bad_request(message: &str) -> Self {
        Self {
            error: "bad_request".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// Create an internal error response
    pub fn internal_error() -> Self {
        Self {
            error: "internal_error".to_string(),
            message: "An unexpected error occurred".to_string(),
            details: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.error.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" | "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<MetricServiceError> for ErrorResponse {
    fn from(err: MetricServiceError) -> Self {
        match err {
            MetricServiceError::ValidationError(msg) => ErrorResponse::validation_error(&msg, None),
            MetricServiceError::NotFound(_) => ErrorResponse::not_found("metric"),
            MetricServiceError::RepositoryError(msg) => {
                error!("Metric storage failure: {}", msg);
                ErrorResponse::internal_error()
            }
        }
    }
}

impl From<ProfileServiceError> for ErrorResponse {
    fn from(err: ProfileServiceError) -> Self {
        match err {
            ProfileServiceError::ValidationError(msg) => ErrorResponse::validation_error(&msg, None),
            ProfileServiceError::NotFound(_) => ErrorResponse::not_found("profile"),
            ProfileServiceError::RepositoryError(msg) => {
                error!("Profile storage failure: {}", msg);
                ErrorResponse::internal_error()
            }
        }
    }
}
