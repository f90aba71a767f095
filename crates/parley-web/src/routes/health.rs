//! Liveness and readiness endpoints
//!
//! `/health` answers as long as the process serves requests. `/ready` also
//! checks that the relay has an assistant to forward prompts to.

use crate::services::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};

pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "parley-web"
    }))
}

async fn ready_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if state.relay.assistant_id().trim().is_empty() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not_ready",
                "reason": "no assistant configured"
            })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "status": "ready",
            "sessions": state.sessions.len()
        })),
    )
}
