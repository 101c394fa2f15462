//! Server and API error types.
//!
//! API errors become JSON bodies `{ error, message, timestamp }` with a
//! matching status code.

use std::net::SocketAddr;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use swatch_normalize::SourceError;
use swatch_preview::BuildError;

/// Errors that stop the server from running.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),
}

/// Errors returned from API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The request body is not a usable snippet (400)
    InvalidInput { message: String },

    /// The preview document could not be produced (500, logged)
    RenderFailed { message: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            Self::InvalidInput { message } => (StatusCode::BAD_REQUEST, "invalid_input", message),
            Self::RenderFailed { message } => {
                tracing::error!("Render failed: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, "render_failed", message)
            }
        };

        let body = Json(json!({
            "error": error,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

impl From<SourceError> for ApiError {
    fn from(e: SourceError) -> Self {
        Self::InvalidInput {
            message: e.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::InvalidInput {
            message: e.body_text(),
        }
    }
}

impl From<BuildError> for ApiError {
    fn from(e: BuildError) -> Self {
        Self::RenderFailed {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn empty_source_is_400() {
        let response = ApiError::from(SourceError::Empty).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "invalid_input");
        assert_eq!(body["message"], "Source code is empty");
    }

    #[tokio::test]
    async fn render_failure_is_500() {
        let err = ApiError::RenderFailed {
            message: "template missing".into(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "render_failed");
    }

    #[tokio::test]
    async fn timestamp_is_rfc3339() {
        let response = ApiError::from(SourceError::MissingField("code")).into_response();
        let body = body_json(response).await;

        let timestamp = body["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }
}
