//! Bot configuration: recognizer endpoint, durable store, gateway bind.

use serde::{Deserialize, Serialize};

use super::settings::RuntimeSettings;

/// Hosted recognizer config. Absent entirely when no endpoint is known;
/// stage 1 then degrades to a user notice instead of extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NluConfig {
    /// Recognition endpoint URL.
    pub endpoint: String,
    /// Bearer key; None for unauthenticated endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Intents scoring below this are logged as below threshold.
    #[serde(default = "default_min_intent_score")]
    pub min_intent_score: f64,
    /// Request timeout; expiry counts as "unavailable" for the turn.
    #[serde(default = "default_nlu_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_min_intent_score() -> f64 {
    0.5
}

fn default_nlu_timeout_secs() -> u64 {
    10
}

/// Durable store config for session state and failed-turn transcripts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Valkey URL; None keeps both stores in memory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valkey_url: Option<String>,
    /// Key prefix for state and transcript keys.
    #[serde(default = "default_store_key_prefix")]
    pub key_prefix: String,
    /// Optional TTL applied to persisted keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_secs: Option<u64>,
}

fn default_store_key_prefix() -> String {
    "voyage-agent".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            valkey_url: None,
            key_prefix: default_store_key_prefix(),
            ttl_secs: None,
        }
    }
}

/// Resolved bot config: recognizer + store + gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Recognizer config; None disables extraction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nlu: Option<NluConfig>,
    /// Durable store config.
    #[serde(default)]
    pub store: StoreConfig,
    /// Gateway bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Per-turn deadline applied by the gateway.
    #[serde(default = "default_turn_timeout_secs")]
    pub turn_timeout_secs: u64,
    /// Telemetry sink instrumentation key; passthrough to the external sink.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telemetry_key: Option<String>,
}

fn default_bind() -> String {
    "0.0.0.0:3978".to_string()
}

fn default_turn_timeout_secs() -> u64 {
    30
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            nlu: None,
            store: StoreConfig::default(),
            bind: default_bind(),
            turn_timeout_secs: default_turn_timeout_secs(),
            telemetry_key: None,
        }
    }
}

impl BotConfig {
    /// Resolve from merged settings, with environment overrides:
    /// `VOYAGE_NLU_ENDPOINT`, `VOYAGE_NLU_API_KEY`, `VALKEY_URL`,
    /// `VOYAGE_AGENT_STATE_VALKEY_PREFIX`, `VOYAGE_AGENT_STATE_TTL_SECS`,
    /// `VOYAGE_AGENT_BIND`.
    pub fn from_settings(settings: &RuntimeSettings) -> Self {
        let endpoint = env_string("VOYAGE_NLU_ENDPOINT").or_else(|| settings.nlu.endpoint.clone());
        let nlu = endpoint.map(|endpoint| NluConfig {
            endpoint,
            api_key: env_string("VOYAGE_NLU_API_KEY").or_else(|| settings.nlu.api_key.clone()),
            min_intent_score: settings
                .nlu
                .min_intent_score
                .unwrap_or_else(default_min_intent_score),
            timeout_secs: settings
                .nlu
                .timeout_secs
                .unwrap_or_else(default_nlu_timeout_secs),
        });

        let store = StoreConfig {
            valkey_url: env_string("VALKEY_URL").or_else(|| settings.store.valkey_url.clone()),
            key_prefix: env_string("VOYAGE_AGENT_STATE_VALKEY_PREFIX")
                .or_else(|| settings.store.key_prefix.clone())
                .unwrap_or_else(default_store_key_prefix),
            ttl_secs: env_u64("VOYAGE_AGENT_STATE_TTL_SECS")
                .or(settings.store.ttl_secs)
                .filter(|value| *value > 0),
        };

        Self {
            nlu,
            store,
            bind: env_string("VOYAGE_AGENT_BIND")
                .or_else(|| settings.gateway.bind.clone())
                .unwrap_or_else(default_bind),
            turn_timeout_secs: settings
                .gateway
                .turn_timeout_secs
                .unwrap_or_else(default_turn_timeout_secs),
            telemetry_key: env_string("VOYAGE_TELEMETRY_KEY")
                .or_else(|| settings.telemetry.instrumentation_key.clone()),
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_u64(name: &str) -> Option<u64> {
    let raw = env_string(name)?;
    match raw.parse::<u64>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(
                env_var = name,
                value = %raw,
                "invalid numeric env value; using settings/default"
            );
            None
        }
    }
}
