use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::debug;

use clahe_studio::InteractionController;

// ---------------------------------------------------------------------------
// Flash messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlashKind { Success, Error }

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub text: String,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        FlashMessage { kind: FlashKind::Success, text: text.into() }
    }
    pub fn error(text: impl Into<String>) -> Self {
        FlashMessage { kind: FlashKind::Error, text: text.into() }
    }
}

// ---------------------------------------------------------------------------
// Per-browser session
// ---------------------------------------------------------------------------

pub struct Session {
    /// Upload, slider value and derived images for this browser.
    pub controller: InteractionController,
    /// One-shot flash message for the next page render.
    pub flash: Option<FlashMessage>,
}

impl Session {
    pub fn new() -> Self {
        Session { controller: InteractionController::new(), flash: None }
    }

    /// Takes and returns the current flash message, clearing it.
    pub fn take_flash(&mut self) -> Option<FlashMessage> {
        self.flash.take()
    }
}

/// A session is locked for the whole of one request, which serialises the
/// input events of a single browser.
pub type SharedSession = Arc<Mutex<Session>>;

// ---------------------------------------------------------------------------
// Session store
// ---------------------------------------------------------------------------

struct Entry {
    session: SharedSession,
    last_seen: Instant,
}

/// Maps session ids to sessions. Ids are only ever minted here; an id the
/// store does not know gets a fresh session under a new id.
pub struct SessionStore {
    sessions: HashMap<String, Entry>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        SessionStore { sessions: HashMap::new(), ttl }
    }

    /// Looks up the session for `id`, creating one when `id` is missing,
    /// unknown or expired. Returns the id to use and whether it is new.
    pub fn get_or_create(&mut self, id: Option<&str>) -> (String, SharedSession, bool) {
        self.get_or_create_at(id, Instant::now())
    }

    fn get_or_create_at(&mut self, id: Option<&str>, now: Instant) -> (String, SharedSession, bool) {
        self.prune(now);

        if let Some(id) = id {
            if let Some(entry) = self.sessions.get_mut(id) {
                entry.last_seen = now;
                return (id.to_owned(), entry.session.clone(), false);
            }
        }

        let id = new_session_id();
        let session = Arc::new(Mutex::new(Session::new()));
        self.sessions.insert(id.clone(), Entry { session: session.clone(), last_seen: now });
        debug!(sessions = self.sessions.len(), "session created");
        (id, session, true)
    }

    fn prune(&mut self, now: Instant) {
        let ttl = self.ttl;
        let before = self.sessions.len();
        self.sessions.retain(|_, e| now.saturating_duration_since(e.last_seen) <= ttl);
        let dropped = before - self.sessions.len();
        if dropped > 0 {
            debug!(dropped, "expired sessions pruned");
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.sessions.len()
    }
}

/// 128 random bits as lowercase hex.
pub fn new_session_id() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// ---------------------------------------------------------------------------
// Process-wide state
// ---------------------------------------------------------------------------

pub struct StudioState {
    pub sessions: Mutex<SessionStore>,
    pub max_upload_bytes: usize,
}

impl StudioState {
    pub fn new(session_ttl: Duration, max_upload_bytes: usize) -> Self {
        StudioState {
            sessions: Mutex::new(SessionStore::new(session_ttl)),
            max_upload_bytes,
        }
    }
}

/// Shared state, an `Arc<StudioState>` passed to every request thread.
pub type SharedState = Arc<StudioState>;

/// Locks `mutex`, recovering the guard if a previous holder panicked.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
