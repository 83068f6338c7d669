//! Session store interface used by the HTTP layer to load a request's session
//! before any action runs (and by login/logout to write it).
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::mvc::Session;

/// Result type for session store operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session-store errors (transport/command/serialization).
///
/// Note:
/// - The HTTP layer treats these as internal errors, never as "unauthorized".
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session backend connection error: {0}")]
    BackendConnection(String),
    #[error("session backend command error: {0}")]
    BackendCommand(String),
    #[error("session value error: {0}")]
    InvalidValue(String),
}

/// Keyed by session id (the cookie value).
///
/// Implementations must be cheap to share (`Arc<dyn SessionStore>`).
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    // Backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // `Ok(None)` if the id is unknown or expired.
    async fn load(&self, id: &str) -> SessionResult<Option<Session>>;

    async fn save(&self, id: &str, session: &Session, ttl: Duration) -> SessionResult<()>;

    // Removing an unknown id is not an error.
    async fn remove(&self, id: &str) -> SessionResult<()>;
}
