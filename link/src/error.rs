use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, LinkError>;

/// Errors surfaced by the client collaborators.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Endpoint unreachable or handshake timed out. Fatal at startup.
    #[error("connection to {endpoint} failed: {reason}")]
    Connectivity { endpoint: String, reason: String },

    /// A scheme probe found nothing at the path. This is the expected
    /// "needs creation" signal during provisioning, not a failure.
    #[error("scheme entry not found: {0}")]
    SchemeNotFound(String),

    /// Strict creation hit an entry that is already present.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("table not found: {0}")]
    TableNotFound(String),

    /// The backend rejected the request outright; retrying cannot help.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A retriable backend condition. Absorbed by the session pool's retry
    /// policy; callers only see it if they bypass the pool.
    #[error("transient backend error: {0}")]
    Transient(String),

    /// The pool's retry budget ran out. Terminal.
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },
}

impl LinkError {
    /// True for the not-found probe signal (error taxonomy case (e)).
    pub fn is_not_found(&self) -> bool {
        matches!(self, LinkError::SchemeNotFound(_))
    }
}
