//! Error types for the HTTP surface.

use std::net::SocketAddr;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, error};

use lexigen_shared::VocabError;

/// Server lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Request-level errors, rendered as `{ "error": text }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body could not be read as a generation request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The pipeline rejected the request.
    #[error(transparent)]
    Vocab(#[from] VocabError),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Vocab(VocabError::EmptyRequest) => StatusCode::BAD_REQUEST,
            ApiError::Vocab(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Caller-facing message. Never includes raw model output.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => format!("Invalid request body: {msg}"),
            ApiError::Vocab(VocabError::EmptyRequest) => {
                "At least one category is required".to_string()
            }
            ApiError::Vocab(VocabError::Misconfigured { .. }) => {
                "Completion service credential is not configured".to_string()
            }
            ApiError::Vocab(e) if e.is_generation_failure() => {
                format!("Failed to generate vocabulary: {e}")
            }
            ApiError::Vocab(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            ApiError::Vocab(e) if status.is_server_error() => {
                error!(kind = %e.kind(), error = %e, "generation request failed");
            }
            _ => debug!(error = %self, "rejected generation request"),
        }

        let body = ErrorResponse {
            error: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_status_codes() {
        assert_eq!(
            ApiError::from(VocabError::EmptyRequest).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::BadRequest("eof".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(VocabError::misconfigured("no key"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(VocabError::InsufficientEntries {
                category: "food".into(),
                count: 4
            })
            .into_response()
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn generation_failures_share_prefix() {
        let errors = [
            VocabError::ServiceUnavailable("connection refused".into()),
            VocabError::ServiceError("rate limited".into()),
            VocabError::malformed("not valid JSON", "```json"),
            VocabError::IncompleteResponse {
                category: "food".into(),
            },
        ];
        for e in errors {
            let msg = ApiError::from(e).public_message();
            assert!(msg.starts_with("Failed to generate vocabulary: "), "{msg}");
        }
    }

    #[test]
    fn malformed_message_hides_raw_output() {
        let msg = ApiError::from(VocabError::malformed("not valid JSON", "SECRET RAW OUTPUT"))
            .public_message();
        assert!(!msg.contains("SECRET RAW OUTPUT"));
    }
}
