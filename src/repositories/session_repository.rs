use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::{errors::AppResult, models::domain::SessionState};

/// Key/value storage for per-user quiz progress, keyed by the opaque session id.
///
/// No atomicity is promised across requests: concurrent writers for the same
/// id race and the last `set` wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str) -> AppResult<Option<SessionState>>;
    async fn set(&self, session_id: &str, state: SessionState) -> AppResult<()>;
    async fn clear(&self, session_id: &str) -> AppResult<()>;
}

struct StoredSession {
    state: SessionState,
    touched_at: DateTime<Utc>,
}

pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, StoredSession>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    /// TTLs too large for a `Duration` never expire.
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::try_minutes(ttl_minutes.max(1)).unwrap_or(Duration::MAX),
        }
    }

    fn is_expired(&self, stored: &StoredSession, now: DateTime<Utc>) -> bool {
        now - stored.touched_at > self.ttl
    }

    /// Drops every expired record and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, stored| !self.is_expired(stored, now));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str) -> AppResult<Option<SessionState>> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        match sessions.get_mut(session_id) {
            None => return Ok(None),
            Some(stored) if !self.is_expired(stored, now) => {
                stored.touched_at = now;
                return Ok(Some(stored.state.clone()));
            }
            Some(_) => {}
        }

        log::debug!("Session {} expired", session_id);
        sessions.remove(session_id);
        Ok(None)
    }

    async fn set(&self, session_id: &str, state: SessionState) -> AppResult<()> {
        self.sessions.write().await.insert(
            session_id.to_string(),
            StoredSession {
                state,
                touched_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> AppResult<()> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_state() -> SessionState {
        SessionState {
            quiz_id: Some("mcqs_test.json".to_string()),
            ..SessionState::default()
        }
    }

    #[tokio::test]
    async fn set_get_clear() {
        let store = InMemorySessionStore::new(30);

        assert!(store.get("abc").await.expect("get works").is_none());

        store.set("abc", active_state()).await.expect("set works");
        assert_eq!(
            store.get("abc").await.expect("get works"),
            Some(active_state())
        );

        store.clear("abc").await.expect("clear works");
        assert!(store.get("abc").await.expect("get works").is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn last_write_wins() {
        let store = InMemorySessionStore::new(30);
        let mut first = active_state();
        first.answers.insert(0, "A".to_string());
        let mut second = active_state();
        second.answers.insert(0, "B".to_string());

        store.set("abc", first).await.expect("set works");
        store.set("abc", second.clone()).await.expect("set works");

        assert_eq!(store.get("abc").await.expect("get works"), Some(second));
    }

    #[tokio::test]
    async fn expired_sessions_are_dropped() {
        let store = InMemorySessionStore::new(1);
        store.set("old", active_state()).await.expect("set works");
        store.set("fresh", active_state()).await.expect("set works");

        {
            let mut sessions = store.sessions.write().await;
            if let Some(stored) = sessions.get_mut("old") {
                stored.touched_at = Utc::now() - Duration::minutes(5);
            }
        }

        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.get("old").await.expect("get works").is_none());
        assert!(store.get("fresh").await.expect("get works").is_some());
    }

    #[tokio::test]
    async fn oversized_ttl_keeps_sessions() {
        let store = InMemorySessionStore::new(i64::MAX);
        assert_eq!(store.ttl, Duration::MAX);

        store.set("abc", active_state()).await.expect("set works");
        {
            let mut sessions = store.sessions.write().await;
            if let Some(stored) = sessions.get_mut("abc") {
                stored.touched_at = Utc::now() - Duration::days(3650);
            }
        }

        assert_eq!(store.purge_expired().await, 0);
        assert_eq!(
            store.get("abc").await.expect("get works"),
            Some(active_state())
        );
    }
}
