//! Structured log event names. Attached as `event = ...` fields so log
//! pipelines can filter turns without parsing message text.

/// Event names for turn processing, dialog flow and persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEvent {
    TurnStarted,
    TurnCompleted,
    WelcomeSent,
    NluNotConfigured,
    NluQuerySucceeded,
    NluQueryFailed,
    PrefillCaptured,
    DialogBegan,
    DialogEnded,
    StackUnwound,
    PromptSent,
    PromptRetried,
    InterruptionCancel,
    InterruptionHelp,
    BookingConfirmed,
    BookingDeclined,
    StateLoaded,
    StateLoadFailed,
    StateSaved,
    StateSaveFailed,
    StateBackendEnabled,
    StateValkeyConnected,
    StateValkeyCommandRetrySucceeded,
    StateValkeyCommandRetryFailed,
    TranscriptPersisted,
    TranscriptPersistFailed,
    TurnStageFailed,
}

impl TurnEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TurnStarted => "turn.started",
            Self::TurnCompleted => "turn.completed",
            Self::WelcomeSent => "turn.welcome_sent",
            Self::NluNotConfigured => "nlu.not_configured",
            Self::NluQuerySucceeded => "nlu.query_succeeded",
            Self::NluQueryFailed => "nlu.query_failed",
            Self::PrefillCaptured => "nlu.prefill_captured",
            Self::DialogBegan => "dialog.began",
            Self::DialogEnded => "dialog.ended",
            Self::StackUnwound => "dialog.stack_unwound",
            Self::PromptSent => "dialog.prompt_sent",
            Self::PromptRetried => "dialog.prompt_retried",
            Self::InterruptionCancel => "dialog.interruption_cancel",
            Self::InterruptionHelp => "dialog.interruption_help",
            Self::BookingConfirmed => "booking.confirmed",
            Self::BookingDeclined => "booking.declined",
            Self::StateLoaded => "state.loaded",
            Self::StateLoadFailed => "state.load_failed",
            Self::StateSaved => "state.saved",
            Self::StateSaveFailed => "state.save_failed",
            Self::StateBackendEnabled => "state.backend_enabled",
            Self::StateValkeyConnected => "state.valkey_connected",
            Self::StateValkeyCommandRetrySucceeded => "state.valkey_command_retry_succeeded",
            Self::StateValkeyCommandRetryFailed => "state.valkey_command_retry_failed",
            Self::TranscriptPersisted => "transcript.persisted",
            Self::TranscriptPersistFailed => "transcript.persist_failed",
            Self::TurnStageFailed => "turn.stage_failed",
        }
    }
}
