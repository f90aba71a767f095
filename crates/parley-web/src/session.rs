//! Browser sessions and the thread each one continues
//!
//! A session is identified by a random token stored in the `parley_session`
//! cookie. The relay only remembers which remote thread the session is
//! continuing; everything else lives in the assistant service.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use dashmap::DashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "parley_session";

/// How long an unused session is kept by default
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Opaque per-browser session token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// A fresh random session token
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Relay-side state of one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Remote thread this session continues, once the first prompt created it
    pub thread_id: Option<String>,
}

/// Storage for session state
///
/// Implementations must keep each session independent; the relay never reads
/// one session's state on behalf of another.
pub trait SessionStore: Send + Sync {
    /// State of a session, empty if it has none
    fn load(&self, id: &SessionId) -> SessionState;

    /// Replace the state of a session
    fn save(&self, id: &SessionId, state: SessionState);

    /// Forget a session. Returns whether anything was stored.
    fn destroy(&self, id: &SessionId) -> bool;

    /// Number of sessions with stored state
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop sessions that have gone unused too long. Returns how many went.
    fn purge_idle(&self) -> usize;
}

#[derive(Debug)]
struct StoredSession {
    state: SessionState,
    last_used: Instant,
}

/// Process-local session store
///
/// Sessions unused for longer than the idle timeout read as empty and are
/// removed by [`SessionStore::purge_idle`].
#[derive(Debug)]
pub struct MemorySessionStore {
    sessions: DashMap<SessionId, StoredSession>,
    idle_timeout: Duration,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_timeout,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    fn is_idle(&self, session: &StoredSession, now: Instant) -> bool {
        now.duration_since(session.last_used) >= self.idle_timeout
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, id: &SessionId) -> SessionState {
        let now = Instant::now();
        if let Some(mut entry) = self.sessions.get_mut(id) {
            if !self.is_idle(&entry, now) {
                entry.last_used = now;
                return entry.state.clone();
            }
        }
        self.sessions.remove_if(id, |_, session| self.is_idle(session, now));
        SessionState::default()
    }

    fn save(&self, id: &SessionId, state: SessionState) {
        self.sessions.insert(
            *id,
            StoredSession {
                state,
                last_used: Instant::now(),
            },
        );
    }

    fn destroy(&self, id: &SessionId) -> bool {
        self.sessions.remove(id).is_some()
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }

    fn purge_idle(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !self.is_idle(session, now));
        before.saturating_sub(self.sessions.len())
    }
}

/// Session carried by the request cookie, if it is well formed
pub fn session_from_jar(jar: &CookieJar) -> Option<SessionId> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| cookie.value().parse().ok())
}

/// Session of the request, issuing a new cookie when there is none
pub fn ensure_session(jar: CookieJar) -> (CookieJar, SessionId) {
    match session_from_jar(&jar) {
        Some(id) => (jar, id),
        None => {
            let id = SessionId::generate();
            (jar.add(session_cookie(id)), id)
        }
    }
}

/// Expire the session cookie
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

fn session_cookie(id: SessionId) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
