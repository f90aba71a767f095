//! OpenAI Assistants (v2) implementation of [`AssistantApi`]

use crate::api::AssistantApi;
use crate::error::{AssistantError, Result};
use crate::types::{
    CreateMessageRequest, CreateRunRequest, MessageList, MessageRole, Run, Thread, ThreadMessage,
};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const BETA_HEADER: &str = "OpenAI-Beta";
const BETA_ASSISTANTS_V2: &str = "assistants=v2";

/// Assistants API client
#[derive(Debug, Clone)]
pub struct OpenAiAssistants {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAiAssistants {
    /// Create a new client
    ///
    /// `base_url` defaults to [`DEFAULT_BASE_URL`]; a trailing slash is ignored.
    pub fn new(api_key: String, base_url: Option<String>, timeout_secs: u64) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// API root this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(self.client.get(self.url(path))).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .bearer_auth(&self.api_key)
            .header(BETA_HEADER, BETA_ASSISTANTS_V2)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AssistantError::InvalidResponse(format!("Failed to parse response: {e}")))
    }
}

#[async_trait]
impl AssistantApi for OpenAiAssistants {
    async fn create_thread(&self) -> Result<Thread> {
        let thread: Thread = self.post("threads", &serde_json::json!({})).await?;
        debug!(thread_id = %thread.id, "Created thread");
        Ok(thread)
    }

    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<ThreadMessage> {
        let body = CreateMessageRequest {
            role: MessageRole::User,
            content,
        };
        self.post(&format!("threads/{thread_id}/messages"), &body)
            .await
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        let body = CreateRunRequest { assistant_id };
        let run: Run = self
            .post(&format!("threads/{thread_id}/runs"), &body)
            .await?;
        debug!(thread_id, run_id = %run.id, status = %run.status, "Started run");
        Ok(run)
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.get(&format!("threads/{thread_id}/runs/{run_id}")).await
    }

    async fn latest_message(&self, thread_id: &str) -> Result<Option<ThreadMessage>> {
        let page: MessageList = self
            .get(&format!("threads/{thread_id}/messages?order=desc&limit=1"))
            .await?;
        Ok(page.data.into_iter().next())
    }
}

/// Convert a non-success response into an [`AssistantError`]
async fn error_from_response(response: Response) -> AssistantError {
    #[derive(Deserialize)]
    struct ErrorResponse {
        error: Option<ErrorDetail>,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        message: Option<String>,
    }

    let status = response.status();
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|val| val.to_str().ok())
        .and_then(|val| val.parse::<u64>().ok());

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return AssistantError::Http(format!("Failed to read error response: {e}")),
    };

    let message = serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .and_then(|parsed| parsed.error)
        .and_then(|detail| detail.message)
        .unwrap_or(body);

    match status {
        StatusCode::UNAUTHORIZED => AssistantError::Authentication(message),
        StatusCode::NOT_FOUND => AssistantError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => AssistantError::RateLimit {
            message,
            retry_after,
        },
        other => AssistantError::Api {
            status: other.as_u16(),
            message,
        },
    }
}
