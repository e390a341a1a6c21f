//! Conversational flight-booking agent: a resumable slot-filling dialog
//! engine with an HTTP message gateway.
//!
//! - Turn pipeline: NLU prefill stage + transcript capture stage around
//!   every dialog dispatch.
//! - Dialog stack runtime: booking waterfall + date resolver sub-dialog,
//!   cancel/help interruption, state persisted per session.

#![allow(missing_docs)]

mod activity;
mod config;
mod dialog;
mod engine;
mod gateway;
mod nlu;
mod observability;
mod session;
mod turn;

pub use activity::{Activity, ActivityKind, InboundActivity, InputHint};
pub use config::{
    load_runtime_settings, load_runtime_settings_from_paths, set_config_home_override, BotConfig,
    GatewaySettings, NluConfig, NluSettings, RuntimeSettings, StoreConfig, StoreSettings,
    TelemetrySettings,
};
pub use dialog::booking::{
    confirmation_text, Slot, SlotRecord, BUDGET_PROMPT, CONFIRM_AFFORDANCE, CONFIRM_RETRY,
    DECLINED_NOTICE, DESTINATION_PROMPT, ORIGIN_PROMPT,
};
pub use dialog::date_resolver::AMBIGUOUS_DATE_RETRY;
pub use dialog::interruption::{CANCEL_NOTICE, HELP_TEXT};
pub use dialog::{
    DialogKind, DialogOptions, Direction, Frame, PendingPrompt, PromptKind, ResolverOptions,
    StepOutcome, StepValue,
};
pub use engine::{Engine, TurnOutput, WELCOME_TEXT};
pub use gateway::{
    router, run_http, run_stdio, validate_activity, GatewayState, HealthResponse, TurnResponse,
    DEFAULT_STDIO_SESSION_ID,
};
pub use nlu::{
    extract, EntityMatch, Extraction, Intent, NluClient, RecognizeTurn, RecognizerResult,
    SlotRecognizer,
};
pub use observability::TurnEvent;
pub use session::{SessionGate, SessionState, SessionStateStore, TranscriptArchive};
pub use turn::{
    NluPrefillStage, TopIntent, TranscriptStage, TurnContext, TurnPipeline, TurnStage,
    NLU_NOT_CONFIGURED_NOTICE,
};
