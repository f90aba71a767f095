use crate::error::Result;
use crate::types::{Run, Thread, ThreadMessage};
use async_trait::async_trait;

/// Operations the relay needs from a hosted assistant service
///
/// Implemented by [`crate::OpenAiAssistants`] for the real API. Test code can
/// supply an in-memory implementation.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Create an empty conversation thread
    async fn create_thread(&self) -> Result<Thread>;

    /// Append a user-role message to a thread
    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<ThreadMessage>;

    /// Start a run of `assistant_id` over a thread
    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run>;

    /// Fetch the current state of a run
    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    /// Fetch the newest message in a thread, `None` for an empty thread
    async fn latest_message(&self, thread_id: &str) -> Result<Option<ThreadMessage>>;
}
