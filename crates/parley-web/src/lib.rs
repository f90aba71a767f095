pub mod markdown;
pub mod routes;
pub mod server;
pub mod services;
pub mod session;

mod assets;
mod error;

pub use error::{Result, WebError};
pub use parley_config::RelayConfig;
pub use server::{app_state, build_router, spawn_session_sweeper, start_server};
pub use services::{AppState, RelayError, RelayService};
pub use session::{MemorySessionStore, SessionId, SessionState, SessionStore};
