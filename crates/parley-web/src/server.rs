use crate::assets::static_routes;
use crate::routes::{chat_routes, health_routes};
use crate::services::{AppState, RelayService};
use crate::session::{MemorySessionStore, SessionStore};
use crate::{Result, WebError};
use axum::extract::DefaultBodyLimit;
use axum::Router;
use parley_assistant::{OpenAiAssistants, RunPoller};
use parley_config::RelayConfig;
use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

const MAX_BODY_SIZE_1MB: usize = 1024 * 1024;

/// Longest gap between sweeps of idle sessions
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Assemble the relay router around prepared state
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    Router::new()
        .merge(chat_routes(state.clone()))
        .merge(health_routes(state))
        .merge(static_routes(static_dir))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE_1MB))
        .layer(TraceLayer::new_for_http())
}

/// Relay state backed by the hosted assistant API and in-memory sessions
pub fn app_state(config: &RelayConfig) -> Result<AppState> {
    let api_key = config
        .api_key()
        .map_err(|e| WebError::Config(e.to_string()))?;
    let assistant_id = config
        .assistant_id()
        .map_err(|e| WebError::Config(e.to_string()))?;

    let api = OpenAiAssistants::new(
        api_key.to_string(),
        Some(config.base_url.clone()),
        config.request_timeout_secs,
    );
    let poller = RunPoller::new(config.poll_interval(), config.max_wait());
    let relay = RelayService::new(Arc::new(api), assistant_id, poller);

    let sessions = MemorySessionStore::with_idle_timeout(config.session_idle());
    Ok(AppState::new(relay, Arc::new(sessions)))
}

/// Periodically drop idle sessions from `store`
///
/// The task runs until it is aborted or the runtime shuts down.
pub fn spawn_session_sweeper(store: Arc<dyn SessionStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = tokio::time::interval(every);
        ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticks.tick().await;
            let purged = store.purge_idle();
            if purged > 0 {
                tracing::debug!(purged, remaining = store.len(), "Purged idle sessions");
            }
        }
    })
}

/// Serve the relay until `shutdown` resolves
pub async fn start_server<F>(config: &RelayConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    config
        .validate()
        .map_err(|e| WebError::Config(e.to_string()))?;

    let state = app_state(config)?;
    let sweeper = spawn_session_sweeper(
        state.sessions.clone(),
        config.session_idle().min(MAX_SWEEP_INTERVAL),
    );
    let app = build_router(state, config.static_dir.as_deref());

    let addr: SocketAddr = config
        .listen_addr()
        .parse()
        .map_err(|e| WebError::Config(format!("Invalid address: {e}")))?;

    tracing::info!("Starting web server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(WebError::Io)?;

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;
    sweeper.abort();
    served.map_err(WebError::Io)?;

    tracing::info!("Web server stopped");
    Ok(())
}
