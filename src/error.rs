// Error types shared across the persistence, store, session and config layers.

use thiserror::Error;

/// Failure talking to a persistence back end.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("document store request timed out")]
    Timeout,
    #[error("document store request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("document store returned HTTP {0}")]
    Status(u16),
    #[error("local storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed contestant data: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<reqwest::Error> for PersistenceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PersistenceError::Timeout
        } else if let Some(status) = e.status() {
            PersistenceError::Status(status.as_u16())
        } else {
            PersistenceError::Transport(e)
        }
    }
}

/// Store-level failures. Both are recovered inside the store; callers only
/// see them in logs and through `ContestantStore::is_in_sync`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to load contestants: {0}")]
    LoadFailure(#[source] PersistenceError),
    #[error("failed to save contestants: {0}")]
    SaveFailure(#[source] PersistenceError),
}

/// Login rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Incorrect password")]
    AuthMismatch,
}

/// Invalid startup configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown storage backend '{0}' (expected 'remote' or 'local')")]
    UnknownBackend(String),
    #[error("{0} is required for the remote backend")]
    MissingRemoteSetting(&'static str),
    #[error("invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

/// Session token creation or verification failure.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid session token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("session token is not an admin session")]
    NotAdmin,
}
