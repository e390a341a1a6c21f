//! The per-session state document saved at the end of every turn.

use serde::{Deserialize, Serialize};

use crate::dialog::booking::SlotRecord;
use crate::dialog::Frame;

/// Everything a session needs to survive a process restart: the dialog
/// stack with its prompt metadata, the running transcript, and an optional
/// pre-populated record for the next booking attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Dialog stack frames, bottom first.
    #[serde(default)]
    pub stack: Vec<Frame>,
    /// Tagged `[User]`/`[Bot]` transcript lines in order.
    #[serde(default)]
    pub transcript: Vec<String>,
    /// Record to seed the next booking dialog with (resumed/seeded sessions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_booking: Option<SlotRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::{DialogOptions, Frame, PendingPrompt, PromptKind};

    #[test]
    fn state_round_trips_through_json() {
        let mut frame = Frame::new(DialogOptions::Booking(SlotRecord {
            destination: Some("Berlin".to_string()),
            ..SlotRecord::default()
        }));
        frame.step = 1;
        frame.pending = Some(PendingPrompt {
            kind: PromptKind::Text,
            text: "From what city will you be travelling?".to_string(),
        });
        let state = SessionState {
            stack: vec![frame],
            transcript: vec!["[User]: hi".to_string()],
            next_booking: None,
        };
        let payload = serde_json::to_string(&state).unwrap();
        let restored: SessionState = serde_json::from_str(&payload).unwrap();
        assert_eq!(restored, state);
    }
}
