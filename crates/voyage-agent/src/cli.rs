//! Command-line interface for the voyage-agent binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// voyage-agent: conversational flight-booking engine.
#[derive(Debug, Parser)]
#[command(name = "voyage-agent", version, about)]
pub struct Cli {
    /// Config home override for settings.yaml lookup.
    #[arg(long, global = true)]
    pub conf: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP gateway (POST /api/messages).
    Gateway {
        /// Bind address, e.g. 0.0.0.0:3978.
        #[arg(long)]
        bind: Option<String>,
        /// Per-turn timeout in seconds.
        #[arg(long)]
        turn_timeout: Option<u64>,
    },
    /// Run a local conversation on stdin/stdout.
    Stdio {
        /// Session ID for the conversation.
        #[arg(long, default_value = voyage_agent::DEFAULT_STDIO_SESSION_ID)]
        session_id: String,
    },
}
