//! Stdio gateway: read a line from stdin → run a turn → print the replies.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::activity::InboundActivity;
use crate::engine::Engine;

/// Default session ID when not overridden by flag.
pub const DEFAULT_STDIO_SESSION_ID: &str = "default";

/// Run the stdio loop: read lines, run a turn, print each outbound
/// activity. Exits on EOF or Ctrl+C.
pub async fn run_stdio(engine: Arc<Engine>, session_id: String) -> Result<()> {
    let mut reader = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = reader.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let activity =
            InboundActivity::message(uuid::Uuid::new_v4().to_string(), session_id.clone(), line);
        let output = engine.run_turn(activity).await?;
        for reply in output.activities {
            println!("{}", reply.text);
        }
    }
    Ok(())
}
