use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::upstream::UpstreamError;
use crate::validation::ValidationError;

pub const FALLBACK_MESSAGE: &str = "An unknown server error occurred";

/// Every way a /generate exchange can fail.
/// Rendered as `{"error": <message>}`, plus `details` for validation failures.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Too many requests")]
    RateLimited,

    #[error("Invalid request body")]
    Validation(ValidationError),

    #[error("Server key not configured")]
    NotConfigured,

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::MissingCredential => ApiError::NotConfigured,
            // the provider's own message, empty when it sent no body
            UpstreamError::Api { message, .. } => ApiError::Upstream(message),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotConfigured | ApiError::Upstream(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            ApiError::Validation(details) => json!({
                "error": self.to_string(),
                "details": details,
            }),
            ApiError::NotConfigured => {
                tracing::error!("API_KEY is not configured on the server");
                json!({ "error": self.to_string() })
            }
            ApiError::Upstream(msg) | ApiError::Internal(msg) => {
                tracing::error!("Error in /generate: {msg}");
                let message = if msg.trim().is_empty() {
                    FALLBACK_MESSAGE.to_string()
                } else {
                    msg.clone()
                };
                json!({ "error": message })
            }
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
