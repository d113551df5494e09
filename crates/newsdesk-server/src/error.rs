//! Mapping of runtime failures onto HTTP responses

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use newsdesk_assistant::AssistantError;
use newsdesk_runtime::RuntimeError;
use serde_json::json;
use tracing::{error, warn};

/// Error returned by a handler, rendered as
/// `{"error": {"message": ..., "status": ...}}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<RuntimeError> for ApiError {
    fn from(err: RuntimeError) -> Self {
        let status = match &err {
            RuntimeError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            e if e.is_not_found() => StatusCode::NOT_FOUND,
            RuntimeError::PollTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            // Our own vendor settings are broken, not the vendor
            RuntimeError::Assistant(AssistantError::ConfigurationError(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RuntimeError::RunTerminated { .. } | RuntimeError::Assistant(_) => {
                StatusCode::BAD_GATEWAY
            }
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %err, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %err, "Request rejected");
        }
        Self::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": {
                    "message": self.message,
                    "status": self.status.as_u16(),
                }
            })),
        )
            .into_response()
    }
}
