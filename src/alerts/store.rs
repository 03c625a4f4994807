//! In-memory per-aircraft alert state, shared by every feed poller.
//!
//! Feeds can overlap (a military aircraft inside the point query shows up in
//! both), so one coarse mutex guards the whole map. Each evaluation is a
//! single read-modify-write inside that lock.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use super::model::AlertState;

#[derive(Default)]
pub struct AlertStateStore {
    states: Mutex<HashMap<String, AlertState>>,
}

impl AlertStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the state for `id`, creating a fresh armed state on
    /// first sighting. The lock is held for the duration of `f`, so `f` must
    /// not block or await.
    pub fn with_state<R>(
        &self,
        id: &str,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut AlertState) -> R,
    ) -> R {
        let mut guard = self.states.lock();
        let state = guard
            .entry(id.to_string())
            .or_insert_with(|| AlertState::new(now));
        f(state)
    }

    pub fn get(&self, id: &str) -> Option<AlertState> {
        self.states.lock().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.states.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.lock().is_empty()
    }

    /// Drop every state not seen within `ttl` of `now`. Returns the count
    /// removed. A reaped aircraft that reappears starts fully armed.
    pub fn reap(&self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let cutoff = now - ttl;
        let mut guard = self.states.lock();
        let before = guard.len();
        guard.retain(|_, state| state.last_seen >= cutoff);
        before - guard.len()
    }
}
