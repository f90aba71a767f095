//! Wire types for threads, messages and runs

use serde::{Deserialize, Serialize};
use std::fmt;

/// A remote conversation thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    /// Thread identifier (`thread_...`)
    pub id: String,
    /// Unix timestamp of creation
    #[serde(default)]
    pub created_at: i64,
}

/// Author of a thread message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message written by the end user
    User,
    /// Message produced by the assistant
    Assistant,
}

/// Text payload of a message content part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    /// The text itself
    pub value: String,
    /// Citations and file annotations, kept opaque
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<serde_json::Value>,
}

/// One content part of a thread message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    /// Plain or markdown text
    Text {
        /// The text payload
        text: TextContent,
    },
    /// Images, file references and other parts the relay does not render
    #[serde(other)]
    Other,
}

/// A message stored in a thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadMessage {
    /// Message identifier (`msg_...`)
    pub id: String,
    /// Thread the message belongs to
    #[serde(default)]
    pub thread_id: String,
    /// Author of the message
    pub role: MessageRole,
    /// Content parts, in order
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

impl ThreadMessage {
    /// Text of the first text content part, if any
    pub fn text(&self) -> Option<&str> {
        self.content.iter().find_map(|part| match part {
            MessageContent::Text { text } => Some(text.value.as_str()),
            MessageContent::Other => None,
        })
    }
}

/// A page of thread messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageList {
    /// Messages in the requested order
    pub data: Vec<ThreadMessage>,
    /// Whether more messages exist beyond this page
    #[serde(default)]
    pub has_more: bool,
}

/// Lifecycle state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Waiting to be picked up
    Queued,
    /// The assistant is working on the thread
    InProgress,
    /// The run is blocked on tool outputs
    RequiresAction,
    /// Cancellation was requested
    Cancelling,
    /// The run was cancelled
    Cancelled,
    /// The run failed
    Failed,
    /// The run finished and appended its reply
    Completed,
    /// The run ended early (token limits and similar)
    Incomplete,
    /// The run expired before finishing
    Expired,
    /// A status this client does not know about
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Whether the remote service will never move the run out of this state
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Cancelled
                | RunStatus::Failed
                | RunStatus::Completed
                | RunStatus::Incomplete
                | RunStatus::Expired
        )
    }

    /// Wire name of the status
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error attached to a failed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunError {
    /// Machine readable code (`server_error`, `rate_limit_exceeded`, ...)
    #[serde(default)]
    pub code: String,
    /// Human readable description
    #[serde(default)]
    pub message: String,
}

/// A run of the assistant over a thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Run identifier (`run_...`)
    pub id: String,
    /// Thread the run operates on
    #[serde(default)]
    pub thread_id: String,
    /// Current status
    pub status: RunStatus,
    /// Failure details when `status` is `failed`
    #[serde(default)]
    pub last_error: Option<RunError>,
}

/// Body of `POST /threads/{id}/messages`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateMessageRequest<'a> {
    pub role: MessageRole,
    pub content: &'a str,
}

/// Body of `POST /threads/{id}/runs`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateRunRequest<'a> {
    pub assistant_id: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn run_status_round_trips_known_values() {
        let run: Run = serde_json::from_value(json!({
            "id": "run_1",
            "object": "thread.run",
            "thread_id": "thread_1",
            "status": "in_progress"
        }))
        .unwrap();
        assert_eq!(run.status, RunStatus::InProgress);
        assert!(!run.status.is_terminal());
        assert!(run.last_error.is_none());
    }

    #[test]
    fn unknown_run_status_is_tolerated() {
        let run: Run = serde_json::from_value(json!({
            "id": "run_1",
            "status": "paused_for_reasons"
        }))
        .unwrap();
        assert_eq!(run.status, RunStatus::Unknown);
        assert!(!run.status.is_terminal());
    }

    #[test]
    fn terminal_statuses() {
        for status in [
            RunStatus::Completed,
            RunStatus::Failed,
            RunStatus::Cancelled,
            RunStatus::Expired,
            RunStatus::Incomplete,
        ] {
            assert!(status.is_terminal(), "{status} should be terminal");
        }
        for status in [
            RunStatus::Queued,
            RunStatus::InProgress,
            RunStatus::RequiresAction,
            RunStatus::Cancelling,
        ] {
            assert!(!status.is_terminal(), "{status} should not be terminal");
        }
    }

    #[test]
    fn failed_run_carries_last_error() {
        let run: Run = serde_json::from_value(json!({
            "id": "run_1",
            "status": "failed",
            "last_error": { "code": "server_error", "message": "Something broke" }
        }))
        .unwrap();
        let error = run.last_error.unwrap();
        assert_eq!(error.code, "server_error");
        assert_eq!(error.message, "Something broke");
    }

    #[test]
    fn message_text_skips_non_text_parts() {
        let message: ThreadMessage = serde_json::from_value(json!({
            "id": "msg_1",
            "thread_id": "thread_1",
            "role": "assistant",
            "content": [
                { "type": "image_file", "image_file": { "file_id": "file_1" } },
                { "type": "text", "text": { "value": "Hi there!", "annotations": [] } }
            ]
        }))
        .unwrap();
        assert_eq!(message.role, MessageRole::Assistant);
        assert_eq!(message.content.len(), 2);
        assert_eq!(message.content[0], MessageContent::Other);
        assert_eq!(message.text(), Some("Hi there!"));
    }

    #[test]
    fn message_without_text_has_no_text() {
        let message = ThreadMessage {
            id: "msg_1".to_string(),
            thread_id: "thread_1".to_string(),
            role: MessageRole::Assistant,
            content: vec![MessageContent::Other],
        };
        assert_eq!(message.text(), None);
    }

    #[test]
    fn create_message_request_shape() {
        let body = CreateMessageRequest {
            role: MessageRole::User,
            content: "hello",
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({ "role": "user", "content": "hello" })
        );
    }
}
