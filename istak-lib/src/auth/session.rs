//! Session token and its storage

use std::path::Path;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;

/// An opaque bearer token issued by the login flow.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    access_token: String,
}

impl SessionToken {
    /// Wraps a bearer token string.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.access_token
    }

    /// Returns the token as a bearer authorization header value.
    pub fn as_bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// Process-wide storage holding the current session token.
///
/// The login flow writes the token with [`store`](SessionStore::store);
/// everything in this crate only reads it, and the session guard clears it
/// when the server rejects it.
pub trait SessionStore: Send + Sync {
    /// Returns the stored token, if any.
    fn load(&self) -> Result<Option<SessionToken>, Error>;

    /// Stores a token, replacing any previous one.
    fn store(&self, token: SessionToken) -> Result<(), Error>;

    /// Removes the stored token.
    fn clear(&self) -> Result<(), Error>;
}

/// In-memory token storage.
///
/// # Example
///
/// ```
/// use istak_lib::auth::{MemorySessionStore, SessionStore, SessionToken};
///
/// let store = MemorySessionStore::with_token(SessionToken::new("abc"));
/// assert!(store.load().unwrap().is_some());
/// store.clear().unwrap();
/// assert!(store.load().unwrap().is_none());
/// ```
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<SessionToken>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `token`.
    pub fn with_token(token: SessionToken) -> Self {
        Self {
            token: RwLock::new(Some(token)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionToken>, Error> {
        Ok(self.token.read().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn store(&self, token: SessionToken) -> Result<(), Error> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token);
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

/// Token storage persisted as a small JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Uses the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses `session.json` in the platform data directory, if one exists.
    pub fn default_location() -> Option<Self> {
        directories::ProjectDirs::from("", "", "istak")
            .map(|dirs| Self::new(dirs.data_dir().join("session.json")))
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionToken>, Error> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Storage(e.to_string())),
        };
        let token: SessionToken = serde_json::from_str(&text)?;
        if token.as_str().is_empty() {
            return Ok(None);
        }
        Ok(Some(token))
    }

    fn store(&self, token: SessionToken) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::Storage(e.to_string()))?;
        }
        let text = serde_json::to_string(&token)?;
        std::fs::write(&self.path, text).map_err(|e| Error::Storage(e.to_string()))
    }

    fn clear(&self) -> Result<(), Error> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));
        assert!(store.load().unwrap().is_none());

        store.store(SessionToken::new("tok")).unwrap();
        assert_eq!(store.load().unwrap(), Some(SessionToken::new("tok")));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = SessionToken::new("secret");
        assert_eq!(format!("{:?}", token), "SessionToken(***)");
        assert_eq!(token.as_bearer(), "Bearer secret");
    }
}
