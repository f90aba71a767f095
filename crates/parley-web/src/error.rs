use crate::services::RelayError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Relay(#[from] RelayError),

    /// The request body could not be read as a query
    #[error("{0}")]
    InvalidRequest(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WebError>;

impl WebError {
    /// Status code and generic `error` label sent to the browser
    fn status_and_label(&self) -> (StatusCode, &'static str) {
        match self {
            WebError::Relay(RelayError::EmptyPrompt) | WebError::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, "Invalid prompt")
            }
            WebError::Relay(RelayError::Assistant(e)) if e.is_timeout() => {
                (StatusCode::GATEWAY_TIMEOUT, "Assistant timed out")
            }
            WebError::Relay(RelayError::Assistant(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch assistant response",
            ),
            WebError::Config(_) | WebError::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, label) = self.status_and_label();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(json!({
            "error": label,
            "details": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_assistant::{AssistantError, RunStatus};
    use std::time::Duration;

    #[test]
    fn empty_prompt_is_bad_request() {
        let err = WebError::from(RelayError::EmptyPrompt);
        assert_eq!(err.status_and_label().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unreadable_body_is_bad_request() {
        let err = WebError::InvalidRequest("Failed to parse the request body as JSON".to_string());
        assert_eq!(
            err.status_and_label(),
            (StatusCode::BAD_REQUEST, "Invalid prompt")
        );
    }

    #[test]
    fn run_failure_is_generic_server_error() {
        let err = WebError::from(RelayError::Assistant(AssistantError::RunFailed {
            status: RunStatus::Failed,
            message: "boom".to_string(),
        }));
        assert_eq!(
            err.status_and_label(),
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch assistant response"
            )
        );
    }

    #[test]
    fn timeout_is_distinct_from_failure() {
        let err = WebError::from(RelayError::Assistant(AssistantError::Timeout {
            waited: Duration::from_secs(120),
        }));
        assert_eq!(
            err.status_and_label(),
            (StatusCode::GATEWAY_TIMEOUT, "Assistant timed out")
        );
    }
}
