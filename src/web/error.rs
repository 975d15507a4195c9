use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::completion::UpstreamError;
use crate::web::models::ErrorPayload;

// Failures of the `/generate` endpoint, rendered as `{"error": {"message"}}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Prompt is required in the request body.")]
    MissingPrompt,
    #[error("Request body must be a JSON object with a prompt field: {0}")]
    InvalidBody(String),
    #[error("Request body is too large.")]
    PayloadTooLarge,
    #[error("OpenRouter returned an empty response.")]
    EmptyCompletion,
    #[error("API Error: {0}")]
    Upstream(#[from] UpstreamError),
}

impl From<JsonPayloadError> for ApiError {
    fn from(err: JsonPayloadError) -> Self {
        match err {
            JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                ApiError::PayloadTooLarge
            }
            other => ApiError::InvalidBody(other.to_string()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingPrompt | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::EmptyCompletion => StatusCode::INTERNAL_SERVER_ERROR,
            // Mirror the upstream status only when it is an actual error status
            ApiError::Upstream(e) => e
                .status()
                .and_then(|code| StatusCode::from_u16(code).ok())
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorPayload::new(self.to_string()))
    }
}
