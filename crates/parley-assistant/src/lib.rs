//! # Parley Assistant
//!
//! Client for the hosted assistant API that Parley relays prompts to.
//!
//! The API is thread based: a conversation lives in a remote thread, a prompt
//! is appended as a user message, and a run asks the assistant to process the
//! thread. Runs finish asynchronously, so callers poll them with [`RunPoller`].
//!
//! ```rust,no_run
//! use parley_assistant::{AssistantApi, OpenAiAssistants, RunPoller};
//!
//! # async fn demo() -> parley_assistant::Result<()> {
//! let api = OpenAiAssistants::new("sk-...".to_string(), None, 60);
//! let thread = api.create_thread().await?;
//! api.add_user_message(&thread.id, "hello").await?;
//! let run = api.create_run(&thread.id, "asst_123").await?;
//! RunPoller::default().wait_for_completion(&api, &thread.id, &run.id).await?;
//! let reply = api.latest_message(&thread.id).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod api;
mod client;
mod error;
mod poll;
mod types;

#[cfg(any(test, feature = "test-utils"))]
mod mock;

pub use api::AssistantApi;
pub use client::{OpenAiAssistants, DEFAULT_BASE_URL};
pub use error::{AssistantError, Result};
pub use poll::{RunPoller, DEFAULT_MAX_WAIT, DEFAULT_POLL_INTERVAL};
pub use types::*;

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockAssistant;
