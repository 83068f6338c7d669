//! In-memory session storage for development and tests.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::mvc::Session;

use super::store::{SessionResult, SessionStore};

type Entries = HashMap<String, (Session, Instant)>;

/// Sessions live in a `HashMap` behind `Arc<RwLock<_>>`; clones share it.
/// Nothing is persisted.
///
/// Expired entries are dropped when `load` runs into them, and in bulk by
/// [`MemorySessionStore::spawn_sweeper`] for sessions nobody asks for again.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<Entries>>,
}

fn purge(sessions: &mut Entries, now: Instant) -> usize {
    let before = sessions.len();
    sessions.retain(|_, (_, expires_at)| *expires_at > now);
    before - sessions.len()
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop expired entries. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        purge(&mut *self.sessions.write().await, Instant::now())
    }

    /// Purge expired entries every `every` until the last store handle is dropped.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let sessions: Weak<RwLock<Entries>> = Arc::downgrade(&self.sessions);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(sessions) = sessions.upgrade() else {
                    break;
                };
                let removed = purge(&mut *sessions.write().await, Instant::now());
                if removed > 0 {
                    tracing::debug!(removed, "purged expired sessions");
                }
            }
        })
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self, id: &str) -> SessionResult<Option<Session>> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(id) {
                None => return Ok(None),
                Some((session, expires_at)) if *expires_at > Instant::now() => {
                    return Ok(Some(session.clone()));
                }
                Some(_) => {}
            }
        }

        // Expired. Re-check under the write lock: a concurrent save may have
        // refreshed it in between.
        let mut sessions = self.sessions.write().await;
        match sessions.get(id) {
            Some((session, expires_at)) if *expires_at > Instant::now() => {
                Ok(Some(session.clone()))
            }
            Some(_) => {
                sessions.remove(id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn save(&self, id: &str, session: &Session, ttl: Duration) -> SessionResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(id.to_string(), (session.clone(), Instant::now() + ttl));
        Ok(())
    }

    async fn remove(&self, id: &str) -> SessionResult<()> {
        self.sessions.write().await.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Session {
        [("username", "alice")].into_iter().collect()
    }

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn save_and_load() {
        let store = MemorySessionStore::new();
        store.save("sid-1", &alice(), HOUR).await.unwrap();

        let loaded = store.load("sid-1").await.unwrap().unwrap();
        assert_eq!(loaded.get("username"), Some("alice"));
    }

    #[tokio::test]
    async fn load_unknown_is_none() {
        let store = MemorySessionStore::new();
        assert!(store.load("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = MemorySessionStore::new();
        store.save("sid-1", &alice(), HOUR).await.unwrap();

        store.remove("sid-1").await.unwrap();
        store.remove("sid-1").await.unwrap();
        assert!(store.load("sid-1").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_sessions_are_not_returned() {
        let store = MemorySessionStore::new();
        store
            .save("sid-1", &alice(), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(61)).await;

        assert!(store.load("sid-1").await.unwrap().is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn purge_drops_only_expired_entries() {
        let store = MemorySessionStore::new();
        store.save("short", &alice(), Duration::from_secs(60)).await.unwrap();
        store.save("long", &alice(), HOUR).await.unwrap();

        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.load("long").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_evicts_sessions_nobody_loads_again() {
        let store = MemorySessionStore::new();
        let sweeper = store.spawn_sweeper(Duration::from_secs(30));

        for i in 0..1000 {
            store
                .save(&format!("sid-{i}"), &alice(), Duration::from_secs(10))
                .await
                .unwrap();
        }
        tokio::time::sleep(Duration::from_secs(11)).await;
        store.save("fresh", &alice(), HOUR).await.unwrap();
        assert_eq!(store.len().await, 1001);

        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(store.len().await, 1);
        assert!(store.load("fresh").await.unwrap().is_some());
        sweeper.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_stops_when_the_store_is_dropped() {
        let store = MemorySessionStore::new();
        let sweeper = store.spawn_sweeper(Duration::from_secs(30));
        drop(store);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(sweeper.await.is_ok());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = MemorySessionStore::new();
        let clone = store.clone();

        store.save("sid-1", &alice(), HOUR).await.unwrap();
        assert!(clone.load("sid-1").await.unwrap().is_some());
    }
}
