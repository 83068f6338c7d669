/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - sessions: SessionStore, authenticator: 起動時に解決済みの Authenticator
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::config::SessionConfig;
use crate::security::Authenticator;
use crate::services::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub authenticator: Arc<dyn Authenticator>,
    pub session: SessionConfig,
}

impl AppState {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        authenticator: Arc<dyn Authenticator>,
        session: SessionConfig,
    ) -> Self {
        Self {
            sessions,
            authenticator,
            session,
        }
    }
}
