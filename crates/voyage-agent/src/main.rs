//! voyage-agent CLI: HTTP gateway or stdio mode.
//!
//! Logging: set `RUST_LOG=voyage_agent=info` (or `warn`, `debug`) to see
//! agent logs on stderr.

mod cli;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use voyage_agent::{
    load_runtime_settings, run_http, run_stdio, set_config_home_override, BotConfig, Engine,
};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(conf_dir) = cli.conf.clone() {
        set_config_home_override(conf_dir);
    }
    let settings = load_runtime_settings();

    // Initialize tracing: RUST_LOG overrides; default info.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("voyage_agent=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut config = BotConfig::from_settings(&settings);
    if config.telemetry_key.is_some() {
        tracing::info!("telemetry instrumentation key configured");
    }

    match cli.command {
        Command::Gateway { bind, turn_timeout } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(turn_timeout) = turn_timeout {
                config.turn_timeout_secs = turn_timeout;
            }
            let engine = Arc::new(Engine::from_config(&config)?);
            run_http(engine, &config.bind, config.turn_timeout_secs).await
        }
        Command::Stdio { session_id } => {
            let engine = Arc::new(Engine::from_config(&config)?);
            run_stdio(engine, session_id).await
        }
    }
}
