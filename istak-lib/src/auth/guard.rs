//! Session guard

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use log::warn;

use super::SessionStore;
use super::SessionToken;
use crate::error::AuthError;

/// Outcome of [`SessionGuard::authorize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    /// A token is present; protected calls may proceed with it.
    Authorized(SessionToken),
    /// No token has been stored. Redirect to login without fetching.
    Unauthenticated,
    /// The server rejected the last token, which has been cleared. Redirect to login.
    Expired,
}

/// Decides whether protected calls may proceed.
///
/// Reads the token on every call and clears it when a protected call comes
/// back 401/403. It never touches the network itself. Expiry is handled the
/// same way for every resource: clear the token, report
/// [`AuthError::Expired`], and let the caller send the user to login.
#[derive(Clone)]
pub struct SessionGuard {
    store: Arc<dyn SessionStore>,
    expired: Arc<AtomicBool>,
}

impl SessionGuard {
    /// Creates a guard over a token store.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            expired: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Resolves the current session.
    pub fn authorize(&self) -> Authorization {
        match self.store.load() {
            Ok(Some(token)) => {
                self.expired.store(false, Ordering::Relaxed);
                Authorization::Authorized(token)
            }
            Ok(None) if self.expired.load(Ordering::Relaxed) => Authorization::Expired,
            Ok(None) => Authorization::Unauthenticated,
            Err(e) => {
                warn!("Failed to read session token: {}", e);
                Authorization::Unauthenticated
            }
        }
    }

    /// Returns the token, or the reason there is none.
    pub fn require(&self) -> Result<SessionToken, AuthError> {
        match self.authorize() {
            Authorization::Authorized(token) => Ok(token),
            Authorization::Unauthenticated => Err(AuthError::Unauthenticated),
            Authorization::Expired => Err(AuthError::Expired { status: 401 }),
        }
    }

    /// Records a rejected token: clears it and returns the error to surface.
    pub fn expire(&self, status: u16) -> AuthError {
        warn!("Session rejected with HTTP {}, clearing token", status);
        if let Err(e) = self.store.clear() {
            warn!("Failed to clear session token: {}", e);
        }
        self.expired.store(true, Ordering::Relaxed);
        AuthError::Expired { status }
    }

    /// Returns `true` for statuses that mean the session is no longer valid.
    pub fn is_auth_failure(status: u16) -> bool {
        matches!(status, 401 | 403)
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("expired", &self.expired.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemorySessionStore;

    #[test]
    fn test_no_token_is_unauthenticated() {
        let guard = SessionGuard::new(Arc::new(MemorySessionStore::new()));
        assert_eq!(guard.authorize(), Authorization::Unauthenticated);
        assert_eq!(guard.require(), Err(AuthError::Unauthenticated));
    }

    #[test]
    fn test_expire_clears_token() {
        let store = Arc::new(MemorySessionStore::with_token(SessionToken::new("t")));
        let guard = SessionGuard::new(store.clone());
        assert_eq!(guard.authorize(), Authorization::Authorized(SessionToken::new("t")));

        assert_eq!(guard.expire(403), AuthError::Expired { status: 403 });
        assert!(store.load().unwrap().is_none());
        assert_eq!(guard.authorize(), Authorization::Expired);
    }

    #[test]
    fn test_new_login_recovers() {
        let store = Arc::new(MemorySessionStore::new());
        let guard = SessionGuard::new(store.clone());
        guard.expire(401);
        store.store(SessionToken::new("fresh")).unwrap();
        assert_eq!(guard.authorize(), Authorization::Authorized(SessionToken::new("fresh")));
    }

    #[test]
    fn test_auth_failure_statuses() {
        assert!(SessionGuard::is_auth_failure(401));
        assert!(SessionGuard::is_auth_failure(403));
        assert!(!SessionGuard::is_auth_failure(400));
    }
}
