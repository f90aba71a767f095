//! Relay between one browser session and its assistant thread
//!
//! The service is stateless apart from its configuration. Callers pass the
//! session's [`SessionState`] in explicitly and persist it themselves, so the
//! relay can be driven without any session store.

use crate::session::SessionState;
use parley_assistant::{AssistantApi, AssistantError, MessageRole, RunPoller};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Reply used when a completed run leaves no assistant text in the thread
pub const NO_RESPONSE: &str = "No response.";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error(transparent)]
    Assistant(#[from] AssistantError),
}

pub struct RelayService {
    api: Arc<dyn AssistantApi>,
    assistant_id: String,
    poller: RunPoller,
}

impl RelayService {
    pub fn new(api: Arc<dyn AssistantApi>, assistant_id: impl Into<String>, poller: RunPoller) -> Self {
        Self {
            api,
            assistant_id: assistant_id.into(),
            poller,
        }
    }

    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }

    /// Send a prompt on the session's thread and wait for the assistant reply
    ///
    /// A thread is created on first use and stays bound to the session, even
    /// if a later step of the same call fails.
    pub async fn submit_prompt(
        &self,
        session: &mut SessionState,
        prompt: &str,
    ) -> Result<String, RelayError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(RelayError::EmptyPrompt);
        }

        let thread_id = self.open_thread(session).await?;

        self.api.add_user_message(&thread_id, prompt).await?;
        let run = self.api.create_run(&thread_id, &self.assistant_id).await?;
        debug!(thread_id = %thread_id, run_id = %run.id, "Started run");

        if let Err(e) = self
            .poller
            .wait_for_completion(self.api.as_ref(), &thread_id, &run.id)
            .await
        {
            warn!(thread_id = %thread_id, run_id = %run.id, "Run did not complete: {}", e);
            return Err(e.into());
        }

        let reply = self
            .api
            .latest_message(&thread_id)
            .await?
            .filter(|message| message.role == MessageRole::Assistant)
            .and_then(|message| message.text().map(str::to_string));

        Ok(reply.unwrap_or_else(|| NO_RESPONSE.to_string()))
    }

    /// Thread bound to the session, creating and binding one if needed
    pub async fn open_thread(&self, session: &mut SessionState) -> Result<String, RelayError> {
        if let Some(id) = &session.thread_id {
            return Ok(id.clone());
        }
        let thread = self.api.create_thread().await?;
        info!(thread_id = %thread.id, "Created assistant thread");
        session.thread_id = Some(thread.id.clone());
        Ok(thread.id)
    }

    /// Unbind the session from its thread
    pub fn reset_session(&self, session: &mut SessionState) {
        if let Some(thread_id) = session.thread_id.take() {
            debug!(thread_id = %thread_id, "Released assistant thread");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_assistant::{MockAssistant, RunStatus};
    use std::time::Duration;

    fn relay(mock: &Arc<MockAssistant>) -> RelayService {
        RelayService::new(
            mock.clone(),
            "asst_test",
            RunPoller::new(Duration::from_millis(10), Duration::from_secs(1)),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn first_prompt_binds_a_thread() {
        let mock = Arc::new(MockAssistant::new().with_reply("Hi there!"));
        let relay = relay(&mock);
        let mut session = SessionState::default();

        let reply = tokio_test::assert_ok!(relay.submit_prompt(&mut session, "hello").await);

        assert_eq!(reply, "Hi there!");
        assert_eq!(session.thread_id.as_deref(), Some("thread_1"));
        assert_eq!(mock.run_assistants(), vec!["asst_test".to_string()]);

        let messages = mock.messages("thread_1");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].text(), Some("hello"));
        assert_eq!(messages[1].role, MessageRole::Assistant);
    }

    #[tokio::test(start_paused = true)]
    async fn later_prompts_reuse_the_thread() {
        let mock = Arc::new(MockAssistant::new());
        let relay = relay(&mock);
        let mut session = SessionState::default();

        relay.submit_prompt(&mut session, "one").await.unwrap();
        relay.submit_prompt(&mut session, "two").await.unwrap();

        assert_eq!(mock.threads_created().len(), 1);
        assert_eq!(mock.messages("thread_1").len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_leads_to_a_new_thread() {
        let mock = Arc::new(MockAssistant::new());
        let relay = relay(&mock);
        let mut session = SessionState::default();

        relay.submit_prompt(&mut session, "one").await.unwrap();
        relay.reset_session(&mut session);
        assert_eq!(session.thread_id, None);
        relay.submit_prompt(&mut session, "two").await.unwrap();

        assert_eq!(session.thread_id.as_deref(), Some("thread_2"));
        assert_eq!(mock.threads_created().len(), 2);
    }

    #[tokio::test]
    async fn open_thread_binds_once() {
        let mock = Arc::new(MockAssistant::new());
        let relay = relay(&mock);
        let mut session = SessionState::default();

        assert_eq!(relay.open_thread(&mut session).await.unwrap(), "thread_1");
        assert_eq!(relay.open_thread(&mut session).await.unwrap(), "thread_1");
        assert_eq!(session.thread_id.as_deref(), Some("thread_1"));
        assert_eq!(mock.threads_created().len(), 1);
    }

    #[tokio::test]
    async fn blank_prompt_never_reaches_the_api() {
        let mock = Arc::new(MockAssistant::new());
        let relay = relay(&mock);
        let mut session = SessionState::default();

        let err = tokio_test::assert_err!(relay.submit_prompt(&mut session, "  \n\t").await);

        assert!(matches!(err, RelayError::EmptyPrompt));
        assert!(mock.threads_created().is_empty());
        assert_eq!(session.thread_id, None);
    }

    #[tokio::test(start_paused = true)]
    async fn prompt_is_trimmed_before_sending() {
        let mock = Arc::new(MockAssistant::new());
        let relay = relay(&mock);
        let mut session = SessionState::default();

        relay.submit_prompt(&mut session, "  hello \n").await.unwrap();

        assert_eq!(mock.messages("thread_1")[0].text(), Some("hello"));
    }

    #[tokio::test(start_paused = true)]
    async fn completed_run_without_text_falls_back() {
        let mock = Arc::new(MockAssistant::new().without_reply());
        let relay = relay(&mock);
        let mut session = SessionState::default();

        let reply = relay.submit_prompt(&mut session, "hello").await.unwrap();

        assert_eq!(reply, NO_RESPONSE);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_run_keeps_thread_binding() {
        let mock = Arc::new(
            MockAssistant::new()
                .with_run_statuses([RunStatus::InProgress, RunStatus::Failed])
                .with_failure_message("quota exceeded"),
        );
        let relay = relay(&mock);
        let mut session = SessionState::default();

        let err = relay.submit_prompt(&mut session, "hello").await.unwrap_err();

        match err {
            RelayError::Assistant(AssistantError::RunFailed { status, message }) => {
                assert_eq!(status, RunStatus::Failed);
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(session.thread_id.as_deref(), Some("thread_1"));
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_run_times_out() {
        let mock = Arc::new(MockAssistant::new().with_run_statuses([RunStatus::Queued]));
        let relay = relay(&mock);
        let mut session = SessionState::default();

        let err = relay.submit_prompt(&mut session, "hello").await.unwrap_err();

        assert!(matches!(err, RelayError::Assistant(ref e) if e.is_timeout()));
    }

    #[tokio::test]
    async fn thread_creation_failure_leaves_session_unbound() {
        let mock = Arc::new(
            MockAssistant::new()
                .failing_thread_creation(AssistantError::Authentication("bad key".to_string())),
        );
        let relay = relay(&mock);
        let mut session = SessionState::default();

        let err = relay.submit_prompt(&mut session, "hello").await.unwrap_err();

        assert!(matches!(
            err,
            RelayError::Assistant(AssistantError::Authentication(_))
        ));
        assert_eq!(session.thread_id, None);
    }
}
