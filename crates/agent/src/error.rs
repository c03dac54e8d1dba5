//! Unified error handling for the HTTP surface.
//!
//! Only infrastructure failures reach this type. Classification and fetch
//! problems are absorbed by the dispatcher and handlers, which answer with a
//! degraded [`AgentResponse`](parts_assist_core::AgentResponse) instead.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::classifier::ClassificationError;

/// Application-level error type for the agent service.
#[derive(Debug, Error)]
pub enum AppError {
    /// The classifier backend is unreachable or rejected our credentials.
    #[error("Classifier unavailable: {0}")]
    ClassifierUnavailable(#[from] ClassificationError),

    /// The request did not finish within the configured bound.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        // Failing to read the body at all is our fault, not the client's.
        if rejection.status().is_server_error() {
            Self::Internal(rejection.body_text())
        } else {
            Self::BadRequest(rejection.body_text())
        }
    }
}

/// JSON body returned for every error.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl AppError {
    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ClassifierUnavailable(_) => "service_unavailable",
            Self::Timeout(_) => "timeout",
            Self::BadRequest(_) => "bad_request",
            Self::Internal(_) => "internal_error",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::ClassifierUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if !matches!(self, Self::BadRequest(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                code = self.code(),
                sentry_event_id = %event_id,
                "Chat request failed"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::ClassifierUnavailable(_) => {
                "Sorry, the assistant is temporarily unavailable. Please try again shortly."
                    .to_string()
            }
            Self::Timeout(_) => {
                "Sorry, that took too long to answer. Please try again.".to_string()
            }
            Self::BadRequest(_) => self.to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
        };

        let body = ErrorBody {
            error: self.code(),
            message,
        };

        (self.status(), Json(body)).into_response()
    }
}
