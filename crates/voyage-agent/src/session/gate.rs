//! Per-session turn gate: the state machine is not reentrant within a
//! session, so turns for the same session id are serialized here while
//! distinct sessions proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Keyed async mutexes, one per active session.
#[derive(Default)]
pub struct SessionGate {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the gate for a session; held for the duration of the turn.
    pub async fn acquire(&self, session_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_session_turns_are_serialized() {
        let gate = Arc::new(SessionGate::new());
        let first = gate.acquire("s1").await;
        let second = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.acquire("s1").await })
        };
        // The second acquire cannot complete while the first guard is held.
        tokio::task::yield_now().await;
        assert!(!second.is_finished());
        drop(first);
        second.await.unwrap();
    }

    #[tokio::test]
    async fn distinct_sessions_do_not_block_each_other() {
        let gate = SessionGate::new();
        let _first = gate.acquire("s1").await;
        let _second = gate.acquire("s2").await;
    }
}
