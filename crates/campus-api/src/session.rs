//! Per-browser-session state: the assistant conversation history and the
//! (currently never set) current user identity.
//!
//! The store owns the lifecycle explicitly: sessions start empty, the
//! homepage resets history, and nothing expires automatically.

use std::collections::HashMap;
use std::sync::Mutex;

use axum_extra::extract::cookie::{Cookie, SignedCookieJar};
use uuid::Uuid;

use campus_types::conversation::ConversationTurn;

pub const SESSION_COOKIE: &str = "campus_session";

/// History cap per session. On overflow the oldest user/model pair goes
/// first, so the sequence always stays alternating and bounded.
pub const MAX_HISTORY_TURNS: usize = 50;

#[derive(Default)]
pub struct Session {
    pub current_user_id: Option<Uuid>,
    pub history: Vec<ConversationTurn>,
}

#[derive(Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the conversation history; empty for unknown sessions.
    pub fn history(&self, id: Uuid) -> Vec<ConversationTurn> {
        let guard = self.lock();
        guard.get(&id).map(|s| s.history.clone()).unwrap_or_default()
    }

    /// Identity of the logged-in user, once authentication exists to set it.
    pub fn current_user(&self, id: Uuid) -> Option<Uuid> {
        let guard = self.lock();
        guard.get(&id).and_then(|s| s.current_user_id)
    }

    /// Appends one completed exchange, evicting the oldest pair past the cap.
    pub fn append_exchange(&self, id: Uuid, user_turn: ConversationTurn, model_turn: ConversationTurn) {
        let mut guard = self.lock();
        let session = guard.entry(id).or_default();
        session.history.push(user_turn);
        session.history.push(model_turn);
        while session.history.len() > MAX_HISTORY_TURNS {
            session.history.drain(..2);
        }
    }

    pub fn reset_history(&self, id: Uuid) {
        let mut guard = self.lock();
        guard.entry(id).or_default().history.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Session>> {
        // A poisoned lock only means another request panicked mid-append;
        // the map itself is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Reads the session id from the signed cookie, minting an id (and the
/// cookie) on first contact. Returns the jar so the handler can include it
/// in the response.
pub fn session_id(jar: SignedCookieJar) -> (SignedCookieJar, Uuid) {
    if let Some(cookie) = jar.get(SESSION_COOKIE)
        && let Ok(id) = cookie.value().parse()
    {
        return (jar, id);
    }

    let id = Uuid::new_v4();
    let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true);
    (jar.add(cookie), id)
}
