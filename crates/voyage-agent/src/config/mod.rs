//! Configuration: yaml runtime settings plus the resolved bot config.

mod bot;
mod settings;

pub use bot::{BotConfig, NluConfig, StoreConfig};
pub use settings::{
    load_runtime_settings, load_runtime_settings_from_paths, set_config_home_override,
    GatewaySettings, NluSettings, RuntimeSettings, StoreSettings, TelemetrySettings,
};
