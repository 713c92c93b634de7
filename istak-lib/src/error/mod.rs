//! Error types

mod alias;
mod api;
mod auth;
mod validation;

pub use alias::*;
pub use api::*;
pub use auth::*;
pub use validation::*;

/// Top-level error returned by client and table operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport or HTTP failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// No session, or the session was rejected by the server.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The server rejected a mutation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A declared alias table is malformed.
    #[error(transparent)]
    AliasTable(#[from] AliasTableError),

    /// The operation was refused before any request was made.
    #[error("Operation refused: {0}")]
    Refused(String),

    /// The owning view was torn down while the operation was in flight.
    #[error("Operation cancelled")]
    Cancelled,

    /// Session storage could not be read or written.
    #[error("Session storage error: {0}")]
    Storage(String),

    /// Failed to serialize a request body.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` when the caller must send the user to the login surface.
    pub fn requires_login(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Returns `true` for transport failures (connect errors, timeouts).
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Api(ApiError::Network(_)) | Error::Api(ApiError::Timeout(_)))
    }

    /// Returns the text to show the user for this error.
    ///
    /// Validation bodies are surfaced verbatim; transport failures get a
    /// generic message.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(v) => v.body().to_string(),
            Error::Auth(AuthError::Unauthenticated) => "Not authenticated. Please login.".to_string(),
            Error::Auth(AuthError::Expired { .. }) => "Session expired. Please login again.".to_string(),
            e if e.is_network() => "Network error. Please try again.".to_string(),
            other => other.to_string(),
        }
    }
}
