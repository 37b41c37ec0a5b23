pub mod collaborators;
pub mod converse;
pub mod error;
pub mod messages;
pub mod pages;
pub mod profile;
pub mod projects;
pub mod session;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

use campus_ai::GeminiClient;
use campus_db::Database;

use crate::session::SessionStore;

/// Shared state handle. A local newtype rather than a bare
/// `Arc<AppStateInner>` so the `FromRef<AppState>` impl for the cookie
/// `Key` below is legal (both trait and key type are foreign).
#[derive(Clone)]
pub struct AppState(pub Arc<AppStateInner>);

impl std::ops::Deref for AppState {
    type Target = AppStateInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub struct AppStateInner {
    pub db: Database,
    pub ai: GeminiClient,
    pub sessions: SessionStore,
    pub templates: minijinja::Environment<'static>,
    pub cookie_key: Key,
    pub uploads_dir: PathBuf,
}

impl AppStateInner {
    pub fn new(
        db: Database,
        ai: GeminiClient,
        session_secret: &str,
        uploads_dir: PathBuf,
    ) -> Result<Self> {
        Ok(Self {
            db,
            ai,
            sessions: SessionStore::new(),
            templates: pages::templates()?,
            cookie_key: cookie_key(session_secret),
            uploads_dir,
        })
    }
}

// Lets the SignedCookieJar extractor find its key in our state.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.cookie_key.clone()
    }
}

/// Cookie signing key derived from the configured session secret. SHA-512
/// gives the 64 bytes `Key::from` requires regardless of secret length.
pub fn cookie_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn state() -> AppState {
        let db = Database::open_in_memory().expect("in-memory db");
        let ai = GeminiClient::new("test-key", campus_ai::DEFAULT_MODEL);
        let inner = AppStateInner::new(db, ai, "test secret", std::env::temp_dir())
            .expect("test state");
        AppState(Arc::new(inner))
    }
}
