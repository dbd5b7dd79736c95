//! Axum-specific error types and mappings.
//!
//! Maps assembly failures onto HTTP status codes and the JSON error body the
//! UI expects.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use threadcast_core::AssemblyError;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Bad request (invalid input).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A required capability is not configured on this server.
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// The upstream feed failed.
    #[error("Upstream failure: {message}")]
    Upstream {
        message: String,
        status: u16,
        body: String,
    },
}

impl HttpError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotConfigured(_) => StatusCode::NOT_IMPLEMENTED,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (error, details) = match self {
            Self::BadRequest(msg) | Self::NotConfigured(msg) => (msg, None),
            Self::Upstream {
                message,
                status,
                body,
            } => (
                message,
                Some(serde_json::json!({ "status": status, "body": body })),
            ),
        };

        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %error, "Request failed");
        }

        (status, axum::Json(ErrorBody { error, details })).into_response()
    }
}

impl From<AssemblyError> for HttpError {
    fn from(err: AssemblyError) -> Self {
        match err {
            AssemblyError::InvalidUrl(_) => Self::BadRequest(err.to_string()),
            AssemblyError::MissingCredential => Self::NotConfigured(err.to_string()),
            AssemblyError::Upstream { status, ref body } => Self::Upstream {
                message: err.to_string(),
                status,
                body: body.clone(),
            },
        }
    }
}
