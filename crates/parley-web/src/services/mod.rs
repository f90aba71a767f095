mod relay;

pub use relay::{RelayError, RelayService, NO_RESPONSE};

use crate::session::SessionStore;
use std::sync::Arc;

/// State shared by every relay route
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayService>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(relay: RelayService, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            relay: Arc::new(relay),
            sessions,
        }
    }
}
