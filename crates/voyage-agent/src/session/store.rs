//! Session state store and failed-turn transcript archive: in-memory maps
//! with an optional shared Valkey backend.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::RwLock;

use crate::observability::TurnEvent;

use super::redis_backend::ValkeyBackend;
use super::state::SessionState;

/// Per-session state, read at the start of a turn and written at the end.
pub struct SessionStateStore {
    inner: Arc<RwLock<HashMap<String, SessionState>>>,
    valkey: Option<Arc<ValkeyBackend>>,
}

impl SessionStateStore {
    pub(crate) fn new(valkey: Option<Arc<ValkeyBackend>>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            valkey,
        }
    }

    /// Purely in-memory store (tests, single-process runs).
    pub fn in_memory() -> Self {
        Self::new(None)
    }

    /// Load a session's state; a corrupt persisted payload is logged and
    /// treated as absent rather than poisoning the session.
    pub async fn load(&self, session_id: &str) -> Result<Option<SessionState>> {
        if let Some(ref valkey) = self.valkey {
            let payload = valkey.get_state(session_id).await.with_context(|| {
                format!("valkey state read failed for session_id={session_id}")
            })?;
            let state = payload.and_then(|payload| {
                match serde_json::from_str::<SessionState>(&payload) {
                    Ok(state) => Some(state),
                    Err(error) => {
                        tracing::warn!(
                            event = TurnEvent::StateLoadFailed.as_str(),
                            session_id,
                            error = %error,
                            "invalid session state payload in valkey; starting fresh"
                        );
                        None
                    }
                }
            });
            tracing::debug!(
                event = TurnEvent::StateLoaded.as_str(),
                session_id,
                found = state.is_some(),
                backend = "valkey",
                "session state loaded"
            );
            return Ok(state);
        }
        let state = self.inner.read().await.get(session_id).cloned();
        tracing::debug!(
            event = TurnEvent::StateLoaded.as_str(),
            session_id,
            found = state.is_some(),
            backend = "memory",
            "session state loaded"
        );
        Ok(state)
    }

    /// Save a session's state.
    pub async fn save(&self, session_id: &str, state: &SessionState) -> Result<()> {
        if let Some(ref valkey) = self.valkey {
            let payload = serde_json::to_string(state)
                .context("failed to encode session state for valkey")?;
            valkey.set_state(session_id, &payload).await.with_context(|| {
                format!("valkey state write failed for session_id={session_id}")
            })?;
            tracing::debug!(
                event = TurnEvent::StateSaved.as_str(),
                session_id,
                stack_depth = state.stack.len(),
                transcript_lines = state.transcript.len(),
                backend = "valkey",
                "session state saved"
            );
            return Ok(());
        }
        self.inner
            .write()
            .await
            .insert(session_id.to_string(), state.clone());
        tracing::debug!(
            event = TurnEvent::StateSaved.as_str(),
            session_id,
            stack_depth = state.stack.len(),
            transcript_lines = state.transcript.len(),
            backend = "memory",
            "session state saved"
        );
        Ok(())
    }

    /// Drop a session's state.
    pub async fn clear(&self, session_id: &str) -> Result<()> {
        if let Some(ref valkey) = self.valkey {
            valkey.clear_state(session_id).await.with_context(|| {
                format!("valkey state clear failed for session_id={session_id}")
            })?;
            return Ok(());
        }
        self.inner.write().await.remove(session_id);
        Ok(())
    }
}

/// Durable archive for failed-turn transcripts, keyed by the identifier of
/// the message that triggered the failure. At-least-once, best-effort.
pub struct TranscriptArchive {
    inner: Arc<RwLock<HashMap<String, Vec<String>>>>,
    valkey: Option<Arc<ValkeyBackend>>,
}

impl TranscriptArchive {
    pub(crate) fn new(valkey: Option<Arc<ValkeyBackend>>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            valkey,
        }
    }

    /// Purely in-memory archive (tests, single-process runs).
    pub fn in_memory() -> Self {
        Self::new(None)
    }

    /// Write the transcript under the message identifier.
    pub async fn write(&self, message_id: &str, lines: Vec<String>) -> Result<()> {
        if let Some(ref valkey) = self.valkey {
            let payload = serde_json::to_string(&lines)
                .context("failed to encode transcript for valkey")?;
            valkey
                .write_transcript(message_id, &payload)
                .await
                .with_context(|| {
                    format!("valkey transcript write failed for message_id={message_id}")
                })?;
            return Ok(());
        }
        self.inner
            .write()
            .await
            .insert(message_id.to_string(), lines);
        Ok(())
    }

    /// Read a persisted transcript back (diagnostics and tests).
    pub async fn read(&self, message_id: &str) -> Result<Option<Vec<String>>> {
        if let Some(ref valkey) = self.valkey {
            let payload = valkey.read_transcript(message_id).await.with_context(|| {
                format!("valkey transcript read failed for message_id={message_id}")
            })?;
            return payload
                .map(|payload| {
                    serde_json::from_str(&payload)
                        .context("invalid transcript payload in valkey")
                })
                .transpose();
        }
        Ok(self.inner.read().await.get(message_id).cloned())
    }
}
