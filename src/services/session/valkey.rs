use async_trait::async_trait;
use std::time::Duration;

use crate::mvc::Session;

use super::store::{SessionError, SessionResult, SessionStore};

/// Valkey/Redis-backed session store.
///
/// Each session is one JSON string under `<prefix>:<id>` with `SET .. EX`,
/// so expiry is left to the server.
#[derive(Clone)]
pub struct ValkeySessionStore {
    manager: redis::aio::ConnectionManager,
    prefix: String,
}

impl ValkeySessionStore {
    // Connect using a URL like `redis://localhost:6379`
    pub async fn new(url: &str) -> Result<Self, SessionError> {
        Self::new_with_prefix(url, "session").await
    }

    pub async fn new_with_prefix(
        url: &str,
        prefix: impl Into<String>,
    ) -> Result<Self, SessionError> {
        let client =
            redis::Client::open(url).map_err(|e| SessionError::BackendConnection(e.to_string()))?;

        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| SessionError::BackendConnection(e.to_string()))?;

        Ok(Self {
            manager,
            prefix: prefix.into(),
        })
    }

    fn key(&self, id: &str) -> String {
        session_key(&self.prefix, id)
    }
}

fn session_key(prefix: &str, id: &str) -> String {
    format!("{}:{}", prefix, id)
}

// EX expects integer seconds. Clamp to at least 1 sec.
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl SessionStore for ValkeySessionStore {
    fn backend_name(&self) -> &'static str {
        "valkey"
    }

    async fn load(&self, id: &str) -> SessionResult<Option<Session>> {
        let mut conn = self.manager.clone();

        let raw: Option<String> = redis::cmd("GET")
            .arg(self.key(id))
            .query_async(&mut conn)
            .await
            .map_err(|e| SessionError::BackendCommand(e.to_string()))?;

        raw.map(|json| {
            serde_json::from_str::<Session>(&json)
                .map_err(|e| SessionError::InvalidValue(e.to_string()))
        })
        .transpose()
    }

    async fn save(&self, id: &str, session: &Session, ttl: Duration) -> SessionResult<()> {
        let mut conn = self.manager.clone();

        let json =
            serde_json::to_string(session).map_err(|e| SessionError::InvalidValue(e.to_string()))?;

        // SET <key> <json> EX <ttl>
        let _: () = redis::cmd("SET")
            .arg(self.key(id))
            .arg(json)
            .arg("EX")
            .arg(ttl_seconds(ttl))
            .query_async(&mut conn)
            .await
            .map_err(|e| SessionError::BackendCommand(e.to_string()))?;

        Ok(())
    }

    async fn remove(&self, id: &str) -> SessionResult<()> {
        let mut conn = self.manager.clone();

        // DEL returns the number of keys removed; 0 is fine.
        let _: u64 = redis::cmd("DEL")
            .arg(self.key(id))
            .query_async(&mut conn)
            .await
            .map_err(|e| SessionError::BackendCommand(e.to_string()))?;

        Ok(())
    }
}
