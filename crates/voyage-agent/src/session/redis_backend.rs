//! Valkey-backed persistence for session state and failed-turn transcripts,
//! shared across engine instances.

use std::sync::Arc;

use anyhow::{Context, Result};
use redis::FromRedisValue;
use tokio::sync::Mutex;

use crate::config::StoreConfig;
use crate::observability::TurnEvent;

const DEFAULT_KEY_PREFIX: &str = "voyage-agent";

/// Connection parameters resolved from config and environment.
#[derive(Debug, Clone)]
pub(crate) struct ValkeyBackendConfig {
    pub(crate) url: String,
    pub(crate) key_prefix: String,
    pub(crate) ttl_secs: Option<u64>,
}

impl ValkeyBackendConfig {
    /// Resolve from the store config; `None` when no URL is configured.
    pub(crate) fn from_store_config(store: &StoreConfig) -> Option<Self> {
        let url = store
            .valkey_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())?
            .to_string();
        let key_prefix = Some(store.key_prefix.trim())
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_KEY_PREFIX)
            .to_string();
        Some(Self {
            url,
            key_prefix,
            ttl_secs: store.ttl_secs.filter(|value| *value > 0),
        })
    }
}

/// Lazily-connected Valkey client with a single reconnect retry per
/// command, as the session backend cannot assume a stable connection.
pub(crate) struct ValkeyBackend {
    client: redis::Client,
    key_prefix: String,
    ttl_secs: Option<u64>,
    connection: Arc<Mutex<Option<redis::aio::MultiplexedConnection>>>,
}

impl ValkeyBackend {
    pub(crate) fn new(config: ValkeyBackendConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())
            .with_context(|| format!("invalid valkey url for state backend: {}", config.url))?;
        tracing::info!(
            event = TurnEvent::StateBackendEnabled.as_str(),
            key_prefix = %config.key_prefix,
            ttl_secs = ?config.ttl_secs,
            "state store backend enabled: valkey"
        );
        Ok(Self {
            client,
            key_prefix: config.key_prefix,
            ttl_secs: config.ttl_secs,
            connection: Arc::new(Mutex::new(None)),
        })
    }

    fn state_key(&self, session_id: &str) -> String {
        format!("{}:state:{}", self.key_prefix, session_id)
    }

    fn transcript_key(&self, message_id: &str) -> String {
        format!("{}:transcript:{}", self.key_prefix, message_id)
    }

    async fn ensure_connection(
        &self,
        connection: &mut Option<redis::aio::MultiplexedConnection>,
    ) -> Result<()> {
        if connection.is_some() {
            return Ok(());
        }
        *connection = Some(
            self.client
                .get_multiplexed_async_connection()
                .await
                .context("failed to open valkey connection for state backend")?,
        );
        tracing::debug!(
            event = TurnEvent::StateValkeyConnected.as_str(),
            key_prefix = %self.key_prefix,
            "valkey state backend connected"
        );
        Ok(())
    }

    async fn run_command<T, F>(&self, operation: &'static str, build: F) -> Result<T>
    where
        T: FromRedisValue + Send,
        F: Fn() -> redis::Cmd,
    {
        let mut last_err: Option<anyhow::Error> = None;
        for attempt in 0..2 {
            let mut conn_guard = self.connection.lock().await;
            self.ensure_connection(&mut conn_guard).await?;
            let conn = conn_guard
                .as_mut()
                .ok_or_else(|| anyhow::anyhow!("valkey state backend connection unavailable"))?;
            let cmd = build();
            let result: redis::RedisResult<T> = cmd.query_async(conn).await;
            match result {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::debug!(
                            event = TurnEvent::StateValkeyCommandRetrySucceeded.as_str(),
                            operation,
                            attempt = attempt + 1,
                            "valkey command succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(err) => {
                    tracing::warn!(
                        event = TurnEvent::StateValkeyCommandRetryFailed.as_str(),
                        operation,
                        attempt = attempt + 1,
                        error = %err,
                        "valkey command attempt failed; reconnecting"
                    );
                    *conn_guard = None;
                    last_err =
                        Some(anyhow::anyhow!(err).context("valkey command failed for state backend"));
                    if attempt == 0 {
                        continue;
                    }
                }
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("valkey command failed for unknown reason")))
    }

    pub(crate) async fn get_state(&self, session_id: &str) -> Result<Option<String>> {
        let key = self.state_key(session_id);
        self.run_command::<Option<String>, _>("get_state", || {
            let mut cmd = redis::cmd("GET");
            cmd.arg(&key);
            cmd
        })
        .await
    }

    pub(crate) async fn set_state(&self, session_id: &str, payload: &str) -> Result<()> {
        let key = self.state_key(session_id);
        let ttl_secs = self.ttl_secs;
        self.run_command::<(), _>("set_state", || {
            let mut cmd = redis::cmd("SET");
            cmd.arg(&key).arg(payload);
            if let Some(ttl) = ttl_secs {
                cmd.arg("EX").arg(ttl);
            }
            cmd
        })
        .await
    }

    pub(crate) async fn clear_state(&self, session_id: &str) -> Result<()> {
        let key = self.state_key(session_id);
        let _ = self
            .run_command::<i64, _>("clear_state", || {
                let mut cmd = redis::cmd("DEL");
                cmd.arg(&key);
                cmd
            })
            .await?;
        Ok(())
    }

    pub(crate) async fn write_transcript(&self, message_id: &str, payload: &str) -> Result<()> {
        let key = self.transcript_key(message_id);
        let ttl_secs = self.ttl_secs;
        self.run_command::<(), _>("write_transcript", || {
            let mut cmd = redis::cmd("SET");
            cmd.arg(&key).arg(payload);
            if let Some(ttl) = ttl_secs {
                cmd.arg("EX").arg(ttl);
            }
            cmd
        })
        .await
    }

    pub(crate) async fn read_transcript(&self, message_id: &str) -> Result<Option<String>> {
        let key = self.transcript_key(message_id);
        self.run_command::<Option<String>, _>("read_transcript", || {
            let mut cmd = redis::cmd("GET");
            cmd.arg(&key);
            cmd
        })
        .await
    }
}
