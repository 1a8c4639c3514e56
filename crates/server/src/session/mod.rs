//! Game sessions and the in-memory store that owns them.

pub mod prompts;
pub mod protocol;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use tokio::sync::Mutex;

use game_core::{Board, Color, GameMove};

use crate::clients::responder::Continuation;

/// Sessions idle this long are eligible for eviction.
const IDLE_TTL_MINUTES: i64 = 60;

/// One game in progress. The human plays white; the external responder plays
/// black. Mutated once per accepted move, always under the per-session lock.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub id: String,
    pub board: Board,
    pub turn: Color,
    pub last_move_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_move: Option<GameMove>,
    pub ended: bool,
    #[serde(skip)]
    pub continuation: Continuation,
}

impl GameSession {
    pub fn new(id: String) -> Self {
        Self {
            id,
            board: Board::starting(),
            turn: Color::White,
            last_move_date: Utc::now(),
            last_move: None,
            ended: false,
            continuation: Continuation::default(),
        }
    }
}

pub fn new_session_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub type SharedSession = Arc<Mutex<GameSession>>;

/// In-memory, id-keyed session store. The outer lock only guards the map;
/// each session carries its own lock so moves on one session serialize
/// without blocking other sessions.
#[derive(Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<String, SharedSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> (String, SharedSession) {
        let id = new_session_id();
        let session = Arc::new(Mutex::new(GameSession::new(id.clone())));
        self.inner.lock().await.insert(id.clone(), session.clone());
        tracing::info!("Created session {id}");
        (id, session)
    }

    pub async fn get(&self, id: &str) -> Option<SharedSession> {
        self.inner.lock().await.get(id).cloned()
    }

    pub async fn count(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Drop sessions that ended or have sat idle past the TTL. Returns how
    /// many were evicted.
    pub async fn sweep_expired(&self) -> usize {
        let cutoff = Utc::now() - Duration::minutes(IDLE_TTL_MINUTES);
        let mut map = self.inner.lock().await;
        let before = map.len();

        let mut expired = Vec::new();
        for (id, session) in map.iter() {
            // A session locked across a responder call is live; skip it this
            // round rather than waiting on it.
            let Ok(session) = session.try_lock() else {
                continue;
            };
            if session.ended || session.last_move_date < cutoff {
                expired.push(id.clone());
            }
        }
        for id in expired {
            map.remove(&id);
        }

        before - map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_id_shape() {
        let id = new_session_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, new_session_id());
    }

    #[tokio::test]
    async fn test_store_create_and_get() {
        let store = SessionStore::new();
        let (id, _) = store.create().await;
        assert!(store.get(&id).await.is_some());
        assert!(store.get("missing").await.is_none());
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_sweep_removes_ended_and_idle() {
        let store = SessionStore::new();
        let (ended_id, ended) = store.create().await;
        ended.lock().await.ended = true;

        let (idle_id, idle) = store.create().await;
        idle.lock().await.last_move_date = Utc::now() - Duration::hours(2);

        let (live_id, _) = store.create().await;

        assert_eq!(store.sweep_expired().await, 2);
        assert!(store.get(&ended_id).await.is_none());
        assert!(store.get(&idle_id).await.is_none());
        assert!(store.get(&live_id).await.is_some());
    }
}
