//! In-memory [`AssistantApi`] for tests

use crate::api::AssistantApi;
use crate::error::{AssistantError, Result};
use crate::types::{
    MessageContent, MessageRole, Run, RunError, RunStatus, TextContent, Thread, ThreadMessage,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

const DEFAULT_REPLY: &str = "This is a mock response.";

/// Scriptable stand-in for the hosted assistant service
///
/// Threads get sequential identifiers (`thread_1`, `thread_2`, ...). Every run
/// walks through the configured status script, repeating the final status once
/// the script is exhausted. When a run is first observed as `completed` the
/// configured reply is appended to its thread as an assistant message.
pub struct MockAssistant {
    reply: Option<String>,
    statuses: Vec<RunStatus>,
    failure_message: Option<String>,
    fail_thread_creation: Option<AssistantError>,
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    next_id: usize,
    threads: HashMap<String, Vec<ThreadMessage>>,
    runs: HashMap<String, MockRun>,
    threads_created: Vec<String>,
    retrieve_count: usize,
    run_assistants: Vec<String>,
}

struct MockRun {
    thread_id: String,
    script: VecDeque<RunStatus>,
    answered: bool,
}

impl Default for MockAssistant {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAssistant {
    /// A mock whose runs complete immediately with a fixed reply
    pub fn new() -> Self {
        Self {
            reply: Some(DEFAULT_REPLY.to_string()),
            statuses: vec![RunStatus::Completed],
            failure_message: None,
            fail_thread_creation: None,
            state: Mutex::new(MockState::default()),
        }
    }

    /// Set the assistant reply appended on completion
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Some(reply.into());
        self
    }

    /// Complete runs without appending any assistant message
    pub fn without_reply(mut self) -> Self {
        self.reply = None;
        self
    }

    /// Statuses reported by successive `retrieve_run` calls for each run
    pub fn with_run_statuses(mut self, statuses: impl IntoIterator<Item = RunStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        if self.statuses.is_empty() {
            self.statuses.push(RunStatus::Completed);
        }
        self
    }

    /// `last_error.message` reported for failed runs
    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = Some(message.into());
        self
    }

    /// Make `create_thread` fail with the given error
    pub fn failing_thread_creation(mut self, error: AssistantError) -> Self {
        self.fail_thread_creation = Some(error);
        self
    }

    /// Identifiers of every thread created so far, in order
    pub fn threads_created(&self) -> Vec<String> {
        self.lock().threads_created.clone()
    }

    /// Messages stored in a thread, oldest first
    pub fn messages(&self, thread_id: &str) -> Vec<ThreadMessage> {
        self.lock()
            .threads
            .get(thread_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Total number of `retrieve_run` calls
    pub fn retrieve_count(&self) -> usize {
        self.lock().retrieve_count
    }

    /// Assistant identifiers passed to `create_run`, in order
    pub fn run_assistants(&self) -> Vec<String> {
        self.lock().run_assistants.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock assistant state poisoned")
    }
}

fn text_message(id: String, thread_id: &str, role: MessageRole, value: &str) -> ThreadMessage {
    ThreadMessage {
        id,
        thread_id: thread_id.to_string(),
        role,
        content: vec![MessageContent::Text {
            text: TextContent {
                value: value.to_string(),
                annotations: Vec::new(),
            },
        }],
    }
}

impl MockState {
    fn next(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_{}", self.next_id)
    }
}

#[async_trait]
impl AssistantApi for MockAssistant {
    async fn create_thread(&self) -> Result<Thread> {
        if let Some(err) = &self.fail_thread_creation {
            return Err(err.clone());
        }
        let mut state = self.lock();
        let id = format!("thread_{}", state.threads_created.len() + 1);
        state.threads.insert(id.clone(), Vec::new());
        state.threads_created.push(id.clone());
        Ok(Thread { id, created_at: 0 })
    }

    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<ThreadMessage> {
        let mut state = self.lock();
        let id = state.next("msg");
        let message = text_message(id, thread_id, MessageRole::User, content);
        state
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| AssistantError::NotFound(format!("No thread found with id '{thread_id}'.")))?
            .push(message.clone());
        Ok(message)
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        let mut state = self.lock();
        if !state.threads.contains_key(thread_id) {
            return Err(AssistantError::NotFound(format!(
                "No thread found with id '{thread_id}'."
            )));
        }
        let id = state.next("run");
        state.run_assistants.push(assistant_id.to_string());
        state.runs.insert(
            id.clone(),
            MockRun {
                thread_id: thread_id.to_string(),
                script: self.statuses.iter().copied().collect(),
                answered: false,
            },
        );
        Ok(Run {
            id,
            thread_id: thread_id.to_string(),
            status: RunStatus::Queued,
            last_error: None,
        })
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        let mut state = self.lock();
        state.retrieve_count += 1;

        let run = state
            .runs
            .get_mut(run_id)
            .filter(|run| run.thread_id == thread_id)
            .ok_or_else(|| AssistantError::NotFound(format!("No run found with id '{run_id}'.")))?;

        let status = if run.script.len() > 1 {
            run.script.pop_front().unwrap_or(RunStatus::Completed)
        } else {
            run.script.front().copied().unwrap_or(RunStatus::Completed)
        };

        let needs_reply = status == RunStatus::Completed && !run.answered;
        if needs_reply {
            run.answered = true;
        }

        if needs_reply {
            if let Some(reply) = self.reply.clone() {
                let id = state.next("msg");
                let message = text_message(id, thread_id, MessageRole::Assistant, &reply);
                if let Some(messages) = state.threads.get_mut(thread_id) {
                    messages.push(message);
                }
            }
        }

        let last_error = (status == RunStatus::Failed).then(|| RunError {
            code: "server_error".to_string(),
            message: self.failure_message.clone().unwrap_or_default(),
        });

        Ok(Run {
            id: run_id.to_string(),
            thread_id: thread_id.to_string(),
            status,
            last_error,
        })
    }

    async fn latest_message(&self, thread_id: &str) -> Result<Option<ThreadMessage>> {
        let state = self.lock();
        let messages = state
            .threads
            .get(thread_id)
            .ok_or_else(|| AssistantError::NotFound(format!("No thread found with id '{thread_id}'.")))?;
        Ok(messages.last().cloned())
    }
}
