//! The turn engine: per-session gate, state load, pipeline stages around
//! the dialog dispatch, unconditional state save.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::activity::{Activity, ActivityKind, InboundActivity};
use crate::config::BotConfig;
use crate::dialog::booking::SlotRecord;
use crate::dialog::stack::{self, DispatchOutcome};
use crate::dialog::{DialogOptions, StepValue};
use crate::nlu::{NluClient, SlotRecognizer};
use crate::observability::TurnEvent;
use crate::session::{
    SessionGate, SessionState, SessionStateStore, TranscriptArchive, ValkeyBackend,
    ValkeyBackendConfig,
};
use crate::turn::{NluPrefillStage, TranscriptStage, TurnContext, TurnPipeline, TurnStage};

/// Welcome notice for conversation-update activities.
pub const WELCOME_TEXT: &str =
    "Welcome to the flight booking assistant! Tell me about your trip and I will set it up.";

/// Result of one processed turn.
#[derive(Debug)]
pub struct TurnOutput {
    /// Outbound activities in send order.
    pub activities: Vec<Activity>,
    /// Completed booking record, when the final step confirmed one.
    pub completed: Option<SlotRecord>,
    /// Turn outcome flag at end of turn.
    pub failed: bool,
}

/// Engine: session store + transcript archive + turn pipeline + gate.
pub struct Engine {
    sessions: Arc<SessionStateStore>,
    archive: Arc<TranscriptArchive>,
    pipeline: TurnPipeline,
    gate: SessionGate,
}

impl Engine {
    /// Build the engine from config. Misconfigured collaborators (invalid
    /// Valkey URL, unusable HTTP stack) fail here, before any session is
    /// served; a merely absent recognizer does not.
    pub fn from_config(config: &BotConfig) -> Result<Self> {
        let recognizer: Option<Arc<dyn SlotRecognizer>> = match &config.nlu {
            Some(nlu) => Some(Arc::new(
                NluClient::new(nlu.endpoint.clone(), nlu.api_key.clone(), nlu.timeout_secs)
                    .context("failed to construct recognizer client")?,
            )),
            None => None,
        };
        let min_intent_score = config
            .nlu
            .as_ref()
            .map_or(0.5, |nlu| nlu.min_intent_score);

        let valkey = match ValkeyBackendConfig::from_store_config(&config.store) {
            Some(backend_config) => Some(Arc::new(
                ValkeyBackend::new(backend_config)
                    .context("failed to construct valkey state backend")?,
            )),
            None => None,
        };
        let sessions = Arc::new(SessionStateStore::new(valkey.clone()));
        let archive = Arc::new(TranscriptArchive::new(valkey));

        Ok(Self::assemble(recognizer, min_intent_score, sessions, archive))
    }

    /// Assemble from explicit parts; used by tests to inject a stub
    /// recognizer and share stores across engine instances.
    #[doc(hidden)]
    pub fn with_parts(
        recognizer: Option<Arc<dyn SlotRecognizer>>,
        sessions: Arc<SessionStateStore>,
        archive: Arc<TranscriptArchive>,
    ) -> Self {
        Self::assemble(recognizer, 0.5, sessions, archive)
    }

    fn assemble(
        recognizer: Option<Arc<dyn SlotRecognizer>>,
        min_intent_score: f64,
        sessions: Arc<SessionStateStore>,
        archive: Arc<TranscriptArchive>,
    ) -> Self {
        let pipeline = TurnPipeline::new(vec![
            Arc::new(NluPrefillStage::new(recognizer, min_intent_score)) as Arc<dyn TurnStage>,
            Arc::new(TranscriptStage::new(archive.clone())),
        ]);
        Self {
            sessions,
            archive,
            pipeline,
            gate: SessionGate::new(),
        }
    }

    /// Pre-populate the record for the session's next booking attempt
    /// (resumed sessions, tests).
    pub async fn seed_booking(&self, session_id: &str, record: SlotRecord) -> Result<()> {
        let mut state = self
            .sessions
            .load(session_id)
            .await?
            .unwrap_or_default();
        state.next_booking = Some(record);
        self.sessions.save(session_id, &state).await
    }

    /// Read back a transcript persisted for a failed turn.
    pub async fn persisted_transcript(&self, message_id: &str) -> Result<Option<Vec<String>>> {
        self.archive.read(message_id).await
    }

    /// Process one inbound activity. Turns for the same session are
    /// serialized; collaborator failures inside the turn are absorbed and
    /// never surface to the transport.
    pub async fn run_turn(&self, activity: InboundActivity) -> Result<TurnOutput> {
        let _gate = self.gate.acquire(&activity.session_id).await;
        tracing::info!(
            event = TurnEvent::TurnStarted.as_str(),
            session_id = %activity.session_id,
            activity_id = %activity.id,
            kind = ?activity.kind,
            "turn started"
        );

        let mut state = match self.sessions.load(&activity.session_id).await {
            Ok(state) => state.unwrap_or_default(),
            Err(error) => {
                tracing::warn!(
                    event = TurnEvent::StateLoadFailed.as_str(),
                    session_id = %activity.session_id,
                    error = %format!("{error:#}"),
                    "session state load failed; starting fresh"
                );
                SessionState::default()
            }
        };
        let mut ctx = TurnContext::new();

        match activity.kind {
            ActivityKind::ConversationUpdate => {
                ctx.outbound.push(Activity::notice(WELCOME_TEXT));
                tracing::debug!(
                    event = TurnEvent::WelcomeSent.as_str(),
                    session_id = %activity.session_id,
                    "welcome sent"
                );
            }
            ActivityKind::Message => {
                self.pipeline.before(&activity, &mut state, &mut ctx).await;
                self.dispatch(&activity, &mut state, &mut ctx);
                self.pipeline.after(&activity, &mut state, &mut ctx).await;
            }
        }

        if let Err(error) = self.sessions.save(&activity.session_id, &state).await {
            tracing::error!(
                event = TurnEvent::StateSaveFailed.as_str(),
                session_id = %activity.session_id,
                error = %format!("{error:#}"),
                "session state save failed"
            );
        }

        tracing::info!(
            event = TurnEvent::TurnCompleted.as_str(),
            session_id = %activity.session_id,
            activity_id = %activity.id,
            failed = ctx.failed,
            outbound = ctx.outbound.len(),
            completed = ctx.completed.is_some(),
            "turn completed"
        );
        Ok(TurnOutput {
            activities: ctx.outbound,
            completed: ctx.completed,
            failed: ctx.failed,
        })
    }

    /// Route the message into the dialog stack; an empty stack falls back
    /// to beginning a fresh booking dialog.
    fn dispatch(&self, activity: &InboundActivity, state: &mut SessionState, ctx: &mut TurnContext) {
        let text = activity.text.clone().unwrap_or_default();
        let mut outcome = stack::resume(&mut state.stack, &text, ctx);
        if outcome == DispatchOutcome::EmptyStack {
            let record = state.next_booking.take().unwrap_or_default();
            outcome = stack::begin(&mut state.stack, DialogOptions::Booking(record), ctx);
        }
        if let DispatchOutcome::Finished(Some(StepValue::Record(record))) = outcome {
            ctx.completed = Some(record);
        }
    }
}
