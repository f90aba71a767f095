use crate::types::RunStatus;
use std::time::Duration;
use thiserror::Error;

/// Errors talking to the assistant API or waiting on a run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssistantError {
    /// Transport failure (DNS, connect, TLS, request timeout)
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The API key was rejected
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Too many requests
    #[error("rate limit exceeded: {message}")]
    RateLimit {
        /// Message from the API
        message: String,
        /// Seconds to wait before retrying, from `retry-after`
        retry_after: Option<u64>,
    },

    /// Unknown thread, run or assistant
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success status
    #[error("assistant API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message from the API, or the raw body
        message: String,
    },

    /// The response body did not match the expected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The run reached a terminal state other than `completed`
    #[error("Assistant failed to respond ({status}): {message}")]
    RunFailed {
        /// Terminal status of the run
        status: RunStatus,
        /// Failure description
        message: String,
    },

    /// The run did not reach a terminal state in time
    #[error("Assistant did not respond within {} seconds", .waited.as_secs())]
    Timeout {
        /// How long the poller waited
        waited: Duration,
    },
}

impl AssistantError {
    /// Returns true if polling gave up before the run finished.
    pub fn is_timeout(&self) -> bool {
        matches!(self, AssistantError::Timeout { .. })
    }

    /// Returns true if the run itself ended unsuccessfully.
    pub fn is_run_failure(&self) -> bool {
        matches!(self, AssistantError::RunFailed { .. })
    }
}

impl From<reqwest::Error> for AssistantError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AssistantError::InvalidResponse(format!("Failed to parse response: {err}"))
        } else {
            AssistantError::Http(err.to_string())
        }
    }
}

/// Result type for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_display_mentions_seconds() {
        let err = AssistantError::Timeout {
            waited: Duration::from_secs(120),
        };
        assert!(err.is_timeout());
        assert_eq!(
            err.to_string(),
            "Assistant did not respond within 120 seconds"
        );
    }

    #[test]
    fn run_failure_display() {
        let err = AssistantError::RunFailed {
            status: RunStatus::Failed,
            message: "Something broke".to_string(),
        };
        assert!(err.is_run_failure());
        assert!(!err.is_timeout());
        assert_eq!(
            err.to_string(),
            "Assistant failed to respond (failed): Something broke"
        );
    }
}
