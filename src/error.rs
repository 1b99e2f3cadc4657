use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use thiserror::Error;

/// Failures seen by the studio side of a generation cycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Missing input: {0}")]
    Validation(&'static str),
    #[error("Backend unavailable ({status}): {reason}")]
    BackendUnavailable { status: String, reason: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

impl GenerationError {
    pub fn transport(reason: impl ToString) -> Self {
        GenerationError::BackendUnavailable { status: "transport".to_string(), reason: reason.to_string() }
    }

    /// The single message shown to the user when a cycle fails.
    pub fn user_message(&self) -> &'static str {
        match self {
            GenerationError::Validation(_) => "Please fill in both the brand and the campaign goal.",
            _ => "System Overload. Please retry.",
        }
    }
}

/// Errors returned by the inbound endpoints as `{ "error": ... }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Upstream(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
