//! Terminal chat client
//!
//! [`ChatClient`] talks to a running relay over HTTP and keeps the session
//! cookie between calls. [`Conversation`] layers the transcript on top: empty
//! input is ignored, every prompt produces exactly one assistant entry, and
//! failures become an assistant entry instead of an error.

use parley_web::routes::QueryResponse;
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Prefix of the assistant entry shown when a prompt fails
pub const FAILURE_PREFIX: &str = "Failed to load response. ";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The relay answered with an error status
    #[error("{message}")]
    Relay { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// HTTP client for one relay session
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a fresh session on the relay
    pub async fn reset(&self) -> Result<(), ClientError> {
        let response = self
            .http
            .post(format!("{}/reset", self.base_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(relay_error(response).await);
        }
        debug!("Relay session reset");
        Ok(())
    }

    /// Send a prompt and return the assistant reply
    pub async fn query(&self, prompt: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/query", self.base_url))
            .json(&json!({ "prompt": prompt }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(relay_error(response).await);
        }
        let body: QueryResponse = response.json().await?;
        Ok(body.message)
    }
}

async fn relay_error(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let fallback = status.to_string();
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.details.or(body.error).unwrap_or(fallback),
        Err(_) => fallback,
    };
    ClientError::Relay {
        status: status.as_u16(),
        message,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "you",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub role: Role,
    pub content: String,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.role.label(), self.content)
    }
}

/// Append-only list of chat entries
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) -> &Entry {
        self.entries.push(Entry {
            role,
            content: content.into(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A chat session with its transcript
pub struct Conversation {
    client: ChatClient,
    transcript: Transcript,
}

impl Conversation {
    pub fn new(client: ChatClient) -> Self {
        Self {
            client,
            transcript: Transcript::new(),
        }
    }

    pub fn client(&self) -> &ChatClient {
        &self.client
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Submit one line of input
    ///
    /// Returns the assistant entry, or `None` when the input is blank and
    /// nothing was sent.
    pub async fn submit(&mut self, input: &str) -> Option<&Entry> {
        let prompt = input.trim();
        if prompt.is_empty() {
            return None;
        }

        self.transcript.push(Role::User, prompt);
        let reply = match self.client.query(prompt).await {
            Ok(message) => message,
            Err(e) => format!("{FAILURE_PREFIX}{e}"),
        };
        Some(self.transcript.push(Role::Assistant, reply))
    }
}
