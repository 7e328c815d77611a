//! Session Management
//!
//! Owns the authenticated session: the bearer token and the user record.
//!
//! # Design Philosophy
//!
//! The in-memory cache is the source of truth. Every mutation is written
//! through to disk immediately, and disk failures never propagate: a record
//! that cannot be read loads as an empty session, and a record that cannot
//! be written is logged and forgotten. Token and user are set and cleared
//! together; a session missing either half is not authenticated.

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::models::User;

/// Directory under the home directory holding the session record
pub const SESSION_DIR: &str = ".fumotion-tui";

/// Session record file name
pub const SESSION_FILE: &str = "config.json";

/// Persisted session record
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }
}

/// Default session record location: `~/.fumotion-tui/config.json`
pub fn default_session_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(SESSION_DIR).join(SESSION_FILE))
}

/// Read a session record. Missing and corrupt records both yield an empty session.
pub fn load(path: &Path) -> Session {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "No session record");
            return Session::default();
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable session record");
        Session::default()
    })
}

/// Overwrite the session record in full. Failures are logged, never returned.
pub fn save(path: &Path, session: &Session) {
    if let Err(e) = write_record(path, session) {
        tracing::warn!(path = %path.display(), error = %e, "Failed to persist session");
    }
}

fn write_record(path: &Path, session: &Session) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(session)?;
    std::fs::write(path, json)
}

/// Shared, write-through session cache
#[derive(Debug)]
pub struct SessionStore {
    /// Where the record lives (`None` keeps everything in memory)
    path: Option<PathBuf>,
    cache: RwLock<Session>,
}

impl SessionStore {
    /// Open the store at `path`, loading whatever record is there
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let session = load(&path);
        tracing::debug!(
            path = %path.display(),
            authenticated = session.is_authenticated(),
            "Session loaded"
        );
        Self {
            path: Some(path),
            cache: RwLock::new(session),
        }
    }

    /// Open the store at [`default_session_path`], in memory if there is no home directory
    pub fn open_default() -> Self {
        match default_session_path() {
            Some(path) => Self::open(path),
            None => {
                tracing::warn!("No home directory, session will not be persisted");
                Self::in_memory(Session::default())
            }
        }
    }

    /// A store that never touches disk
    pub fn in_memory(session: Session) -> Self {
        Self {
            path: None,
            cache: RwLock::new(session),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn token(&self) -> Option<String> {
        self.cache.read().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.cache.read().user.clone()
    }

    pub fn snapshot(&self) -> Session {
        self.cache.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.cache.read().is_authenticated()
    }

    /// Whether the current user may open admin screens
    pub fn is_admin(&self) -> bool {
        self.cache
            .read()
            .user
            .as_ref()
            .is_some_and(|user| user.is_admin)
    }

    pub fn set_token(&self, token: Option<String>) {
        self.mutate(|session| session.token = token);
    }

    pub fn set_user(&self, user: Option<User>) {
        self.mutate(|session| session.user = user);
    }

    /// Install a fresh session after login or registration
    pub fn establish(&self, token: String, user: User) {
        tracing::info!(user_id = user.id, "Session established");
        self.mutate(|session| {
            session.token = Some(token);
            session.user = Some(user);
        });
    }

    /// Forget token and user
    pub fn clear(&self) {
        tracing::info!("Session cleared");
        self.mutate(|session| *session = Session::default());
    }

    /// Apply a change and persist it under the write lock
    fn mutate(&self, change: impl FnOnce(&mut Session)) {
        let mut session = self.cache.write();
        change(&mut session);
        if let Some(path) = &self.path {
            save(path, &session);
        }
    }
}
