//! Per-session conversation history (C7 `use_history`).
//!
//! Adapted from the teacher's `DashMap`-backed session-isolation pattern:
//! where that version keyed a collection-name prefix per connection, this
//! one keys a [`ConversationHistory`] per session id, so a multi-turn
//! `/query` conversation survives across requests without a database
//! round trip.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use ragq_application::support::ConversationHistory;

struct Entry {
    history: ConversationHistory,
    last_access: Instant,
}

/// In-process store of conversation history, one entry per session id.
#[derive(Default)]
pub struct ConversationSessionStore {
    sessions: DashMap<String, Entry>,
}

impl ConversationSessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Fetch a session's history, or an empty one if it has never been
    /// seen. Does not create an entry by itself — call [`Self::store`]
    /// after the caller mutates the returned history.
    pub fn get(&self, session_id: &str) -> ConversationHistory {
        self.sessions
            .get(session_id)
            .map(|entry| entry.history.clone())
            .unwrap_or_default()
    }

    /// Persist `history` for `session_id`, refreshing its last-access
    /// time.
    pub fn store(&self, session_id: &str, history: ConversationHistory) {
        self.sessions.insert(
            session_id.to_string(),
            Entry {
                history,
                last_access: Instant::now(),
            },
        );
    }

    /// Drop a session's history.
    pub fn remove(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    /// Number of tracked sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drop sessions untouched for longer than `max_age`.
    pub fn cleanup_idle(&self, max_age: Duration) {
        let now = Instant::now();
        self.sessions
            .retain(|_, entry| now.duration_since(entry.last_access) < max_age);
    }
}

/// Create a shared store.
pub fn create_session_store() -> Arc<ConversationSessionStore> {
    Arc::new(ConversationSessionStore::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_session_returns_empty_history() {
        let store = ConversationSessionStore::new();
        assert_eq!(store.get("nope"), ConversationHistory::default());
    }

    #[test]
    fn stored_history_round_trips() {
        let store = ConversationSessionStore::new();
        let mut history = ConversationHistory::default();
        history.push("q1", "a1");
        store.store("s1", history.clone());
        assert_eq!(store.get("s1"), history);
    }

    #[test]
    fn removed_session_reverts_to_empty() {
        let store = ConversationSessionStore::new();
        store.store("s1", {
            let mut h = ConversationHistory::default();
            h.push("q", "a");
            h
        });
        store.remove("s1");
        assert_eq!(store.get("s1"), ConversationHistory::default());
    }

    #[test]
    fn cleanup_idle_drops_untouched_sessions() {
        let store = ConversationSessionStore::new();
        store.store("s1", ConversationHistory::default());
        store.cleanup_idle(Duration::from_secs(0));
        assert_eq!(store.session_count(), 0);
    }
}
