//! Session error types

/// Errors raised by the session guard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No session token is stored. No request was attempted.
    #[error("Not authenticated")]
    Unauthenticated,

    /// A protected call was rejected with 401/403. The stored token has been cleared.
    #[error("Session expired (HTTP {status})")]
    Expired { status: u16 },
}
