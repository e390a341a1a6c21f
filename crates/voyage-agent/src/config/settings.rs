//! Runtime settings loader for voyage-agent.
//!
//! Loads and merges:
//! - System defaults: `<VOYAGE_ROOT>/conf/settings.yaml`
//! - User overrides:  `<VOYAGE_CONFIG_HOME>/voyage/settings.yaml`
//!
//! Merge precedence is user over system.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;

const DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH: &str = "conf/settings.yaml";
const DEFAULT_USER_SETTINGS_RELATIVE_PATH: &str = "voyage/settings.yaml";
const DEFAULT_CONFIG_HOME_RELATIVE_PATH: &str = ".config";
static CONFIG_HOME_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

/// Merged settings document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeSettings {
    #[serde(default)]
    pub gateway: GatewaySettings,
    #[serde(default)]
    pub nlu: NluSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

/// Telemetry sink settings; passthrough only, the sink itself is external.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelemetrySettings {
    pub instrumentation_key: Option<String>,
}

/// HTTP gateway settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewaySettings {
    pub bind: Option<String>,
    pub turn_timeout_secs: Option<u64>,
}

/// Hosted recognizer settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NluSettings {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub min_intent_score: Option<f64>,
    pub timeout_secs: Option<u64>,
}

/// Durable store settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSettings {
    pub valkey_url: Option<String>,
    pub key_prefix: Option<String>,
    pub ttl_secs: Option<u64>,
}

impl RuntimeSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            gateway: self.gateway.merge(overlay.gateway),
            nlu: self.nlu.merge(overlay.nlu),
            store: self.store.merge(overlay.store),
            telemetry: self.telemetry.merge(overlay.telemetry),
        }
    }
}

impl TelemetrySettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            instrumentation_key: overlay.instrumentation_key.or(self.instrumentation_key),
        }
    }
}

impl GatewaySettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            bind: overlay.bind.or(self.bind),
            turn_timeout_secs: overlay.turn_timeout_secs.or(self.turn_timeout_secs),
        }
    }
}

impl NluSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            endpoint: overlay.endpoint.or(self.endpoint),
            api_key: overlay.api_key.or(self.api_key),
            min_intent_score: overlay.min_intent_score.or(self.min_intent_score),
            timeout_secs: overlay.timeout_secs.or(self.timeout_secs),
        }
    }
}

impl StoreSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            valkey_url: overlay.valkey_url.or(self.valkey_url),
            key_prefix: overlay.key_prefix.or(self.key_prefix),
            ttl_secs: overlay.ttl_secs.or(self.ttl_secs),
        }
    }
}

/// Load merged runtime settings (user overrides system).
pub fn load_runtime_settings() -> RuntimeSettings {
    let (system_path, user_path) = runtime_settings_paths();
    load_runtime_settings_from_paths(&system_path, &user_path)
}

fn runtime_settings_paths() -> (PathBuf, PathBuf) {
    let root = project_root();
    let system_path = root.join(DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH);
    let user_path = resolve_config_home(&root).join(DEFAULT_USER_SETTINGS_RELATIVE_PATH);
    (system_path, user_path)
}

#[doc(hidden)]
pub fn load_runtime_settings_from_paths(system: &Path, user: &Path) -> RuntimeSettings {
    load_one(system).merge(load_one(user))
}

fn load_one(path: &Path) -> RuntimeSettings {
    if !path.exists() {
        return RuntimeSettings::default();
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to read settings file; ignoring"
            );
            return RuntimeSettings::default();
        }
    };
    match serde_yaml::from_str::<RuntimeSettings>(&raw) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to parse settings yaml; ignoring file"
            );
            RuntimeSettings::default()
        }
    }
}

fn project_root() -> PathBuf {
    std::env::var("VOYAGE_ROOT")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Set config-home override (used by CLI `--conf`).
///
/// The path can be absolute, or relative to `VOYAGE_ROOT`/cwd.
pub fn set_config_home_override(path: impl Into<PathBuf>) {
    let path = path.into();
    if path.as_os_str().is_empty() {
        return;
    }
    if CONFIG_HOME_OVERRIDE.set(path.clone()).is_err()
        && let Some(current) = CONFIG_HOME_OVERRIDE.get()
        && current != &path
    {
        tracing::warn!(
            current = %current.display(),
            ignored = %path.display(),
            "config home override already set; ignoring subsequent value"
        );
    }
}

fn resolve_config_home(project_root: &Path) -> PathBuf {
    if let Some(path) = CONFIG_HOME_OVERRIDE.get() {
        return absolutize(project_root, path.clone());
    }

    let configured = std::env::var("VOYAGE_CONFIG_HOME")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_HOME_RELATIVE_PATH.to_string());
    absolutize(project_root, PathBuf::from(configured))
}

fn absolutize(project_root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        project_root.join(path)
    }
}
