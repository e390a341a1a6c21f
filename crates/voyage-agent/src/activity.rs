//! Activity types exchanged with the transport: one inbound message event
//! per turn, a list of outbound activities back.

use serde::{Deserialize, Serialize};

/// Inbound activity kind. Non-message activities skip the turn pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A user utterance.
    Message,
    /// Conversation membership change (greeting trigger).
    ConversationUpdate,
}

/// One inbound message event from the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundActivity {
    /// Transport-assigned message identifier; keys failed-turn transcripts.
    pub id: String,
    /// Activity kind.
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    /// Conversation session identifier.
    pub session_id: String,
    /// Utterance text (message activities).
    #[serde(default)]
    pub text: Option<String>,
    /// Caller identity, opaque to the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl InboundActivity {
    /// Build a message activity (stdio loop and tests).
    pub fn message(id: impl Into<String>, session_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ActivityKind::Message,
            session_id: session_id.into(),
            text: Some(text.into()),
            from: None,
        }
    }
}

/// Hint to the client about whether the bot expects an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputHint {
    AcceptingInput,
    ExpectingInput,
    IgnoringInput,
}

/// One outbound bot activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Message text.
    pub text: String,
    /// Input hint for the client.
    pub input_hint: InputHint,
}

impl Activity {
    /// A prompt that expects a reply.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            input_hint: InputHint::ExpectingInput,
        }
    }

    /// A notice that does not expect a reply.
    pub fn notice(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            input_hint: InputHint::IgnoringInput,
        }
    }

    /// A plain message.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            input_hint: InputHint::AcceptingInput,
        }
    }
}
