//! Prompt relay and session reset endpoints

use crate::markdown;
use crate::services::{AppState, RelayError};
use crate::session::{clear_session, ensure_session, session_from_jar, SessionId};
use crate::WebError;
use axum::extract::rejection::JsonRejection;
use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Request body for `/api/query`
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub prompt: String,
}

/// Successful `/api/query` reply
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Assistant reply as markdown source
    pub message: String,
    /// Reply rendered to HTML
    pub html: String,
}

pub fn chat_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/query", post(query_handler))
        .route("/reset", post(reset_handler))
        .with_state(state)
}

async fn query_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> (CookieJar, Result<Json<QueryResponse>, WebError>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return (jar, Err(WebError::InvalidRequest(rejection.body_text())));
        }
    };
    // Rejected prompts get no session
    if request.prompt.trim().is_empty() {
        return (jar, Err(RelayError::EmptyPrompt.into()));
    }

    let (jar, session_id) = ensure_session(jar);
    let response = relay_prompt(&state, &session_id, &request.prompt)
        .await
        .map_err(WebError::from)
        .map(|message| {
            let html = markdown::render(&message);
            Json(QueryResponse { message, html })
        });
    (jar, response)
}

/// Bind the session's thread, store the binding, then run the prompt
///
/// The binding is stored before the run starts and never written back
/// afterwards, so a reset during the run stays in effect.
async fn relay_prompt(
    state: &AppState,
    session_id: &SessionId,
    prompt: &str,
) -> Result<String, RelayError> {
    let mut session = state.sessions.load(session_id);
    if session.thread_id.is_none() {
        state.relay.open_thread(&mut session).await?;
        state.sessions.save(session_id, session.clone());
    }
    state.relay.submit_prompt(&mut session, prompt).await
}

async fn reset_handler(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    if let Some(session_id) = session_from_jar(&jar) {
        let mut session = state.sessions.load(&session_id);
        state.relay.reset_session(&mut session);
        state.sessions.destroy(&session_id);
        tracing::debug!(session = %session_id, "Session reset");
    }

    (
        clear_session(jar),
        Json(json!({ "message": "Session reset" })),
    )
}
