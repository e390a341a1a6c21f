//! Ordered turn-processing stages with before/after hooks. Before-hooks run
//! in registration order, after-hooks in reverse, so a later stage wraps
//! the dialog dispatch of everything registered after it ran.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::activity::{Activity, ActivityKind, InboundActivity};
use crate::nlu::{self, RecognizeTurn, SlotRecognizer};
use crate::observability::TurnEvent;
use crate::session::{SessionState, TranscriptArchive};

use super::context::TurnContext;

/// Fixed notice for turns processed without a configured recognizer.
pub const NLU_NOT_CONFIGURED_NOTICE: &str = "NOTE: language understanding is not configured. \
     To enable entity extraction, set VOYAGE_NLU_ENDPOINT and VOYAGE_NLU_API_KEY.";

/// One turn-processing stage.
#[async_trait]
pub trait TurnStage: Send + Sync {
    /// Stage name for logs.
    fn name(&self) -> &'static str;

    /// Runs before the dialog dispatch.
    async fn before_dispatch(
        &self,
        activity: &InboundActivity,
        state: &mut SessionState,
        ctx: &mut TurnContext,
    ) -> Result<()>;

    /// Runs after the dialog dispatch.
    async fn after_dispatch(
        &self,
        activity: &InboundActivity,
        state: &mut SessionState,
        ctx: &mut TurnContext,
    ) -> Result<()>;
}

/// The ordered stage list. Stage errors are collaborator failures: they are
/// logged and absorbed here, never surfaced to the transport.
pub struct TurnPipeline {
    stages: Vec<Arc<dyn TurnStage>>,
}

impl TurnPipeline {
    pub fn new(stages: Vec<Arc<dyn TurnStage>>) -> Self {
        Self { stages }
    }

    pub async fn before(
        &self,
        activity: &InboundActivity,
        state: &mut SessionState,
        ctx: &mut TurnContext,
    ) {
        for stage in &self.stages {
            if let Err(error) = stage.before_dispatch(activity, state, ctx).await {
                tracing::warn!(
                    event = TurnEvent::TurnStageFailed.as_str(),
                    stage = stage.name(),
                    hook = "before",
                    error = %format!("{error:#}"),
                    "turn stage failed; continuing"
                );
            }
        }
    }

    pub async fn after(
        &self,
        activity: &InboundActivity,
        state: &mut SessionState,
        ctx: &mut TurnContext,
    ) {
        for stage in self.stages.iter().rev() {
            if let Err(error) = stage.after_dispatch(activity, state, ctx).await {
                tracing::warn!(
                    event = TurnEvent::TurnStageFailed.as_str(),
                    stage = stage.name(),
                    hook = "after",
                    error = %format!("{error:#}"),
                    "turn stage failed; continuing"
                );
            }
        }
    }
}

/// Stage 1: query the recognizer once per message turn and write extracted
/// entities into the scratch map. A missing recognizer degrades to a fixed
/// user notice; a failing call degrades to no prefill for this turn.
pub struct NluPrefillStage {
    recognizer: Option<Arc<dyn SlotRecognizer>>,
    min_intent_score: f64,
}

impl NluPrefillStage {
    pub fn new(recognizer: Option<Arc<dyn SlotRecognizer>>, min_intent_score: f64) -> Self {
        Self {
            recognizer,
            min_intent_score,
        }
    }
}

#[async_trait]
impl TurnStage for NluPrefillStage {
    fn name(&self) -> &'static str {
        "nlu_prefill"
    }

    async fn before_dispatch(
        &self,
        activity: &InboundActivity,
        _state: &mut SessionState,
        ctx: &mut TurnContext,
    ) -> Result<()> {
        if activity.kind != ActivityKind::Message {
            return Ok(());
        }
        // Default for this turn; only the final booking step flips it.
        ctx.failed = false;

        let Some(recognizer) = self.recognizer.as_ref() else {
            tracing::info!(
                event = TurnEvent::NluNotConfigured.as_str(),
                session_id = %activity.session_id,
                "recognizer not configured; skipping extraction"
            );
            ctx.outbound.push(Activity::notice(NLU_NOT_CONFIGURED_NOTICE));
            return Ok(());
        };

        let turn = RecognizeTurn {
            session_id: activity.session_id.clone(),
            text: activity.text.clone().unwrap_or_default(),
        };
        let result = match recognizer.recognize(&turn).await {
            Ok(result) => result,
            Err(error) => {
                tracing::warn!(
                    event = TurnEvent::NluQueryFailed.as_str(),
                    session_id = %activity.session_id,
                    error = %format!("{error:#}"),
                    "recognizer call failed; no prefill this turn"
                );
                return Ok(());
            }
        };

        let extraction = nlu::extract(&result);
        let prefill_count = extraction.prefill.len();
        for (slot, value) in extraction.prefill {
            ctx.prefill.insert(slot, value);
        }
        if let Some(top) = &extraction.top_intent {
            tracing::info!(
                event = TurnEvent::NluQuerySucceeded.as_str(),
                session_id = %activity.session_id,
                intent = nlu::Intent::from_name(&top.name).as_str(),
                score = top.score,
                below_threshold = top.score < self.min_intent_score,
                "recognizer query succeeded"
            );
        }
        if prefill_count > 0 {
            tracing::debug!(
                event = TurnEvent::PrefillCaptured.as_str(),
                session_id = %activity.session_id,
                entities = prefill_count,
                "prefill captured into scratch map"
            );
        }
        ctx.top_intent = extraction.top_intent;
        Ok(())
    }

    async fn after_dispatch(
        &self,
        _activity: &InboundActivity,
        _state: &mut SessionState,
        _ctx: &mut TurnContext,
    ) -> Result<()> {
        Ok(())
    }
}

/// Stage 2: transcript capture around dispatch, plus persistence of the
/// transcript keyed by the triggering message id when the turn failed.
pub struct TranscriptStage {
    archive: Arc<TranscriptArchive>,
}

impl TranscriptStage {
    pub fn new(archive: Arc<TranscriptArchive>) -> Self {
        Self { archive }
    }
}

#[async_trait]
impl TurnStage for TranscriptStage {
    fn name(&self) -> &'static str {
        "transcript"
    }

    async fn before_dispatch(
        &self,
        activity: &InboundActivity,
        state: &mut SessionState,
        ctx: &mut TurnContext,
    ) -> Result<()> {
        if activity.kind != ActivityKind::Message {
            return Ok(());
        }
        let text = activity.text.as_deref().unwrap_or_default();
        state.transcript.push(format!("[User]: {text}"));
        // Only activities produced during dispatch belong to the transcript.
        ctx.capture_from = ctx.outbound.len();
        Ok(())
    }

    async fn after_dispatch(
        &self,
        activity: &InboundActivity,
        state: &mut SessionState,
        ctx: &mut TurnContext,
    ) -> Result<()> {
        if activity.kind != ActivityKind::Message {
            return Ok(());
        }
        for outbound in ctx.outbound.iter().skip(ctx.capture_from) {
            state.transcript.push(format!("[Bot]: {}", outbound.text));
        }
        if ctx.failed {
            // Best effort: a store failure is logged, not retried.
            match self.archive.write(&activity.id, state.transcript.clone()).await {
                Ok(()) => tracing::info!(
                    event = TurnEvent::TranscriptPersisted.as_str(),
                    session_id = %activity.session_id,
                    message_id = %activity.id,
                    lines = state.transcript.len(),
                    "failed turn; transcript persisted"
                ),
                Err(error) => tracing::warn!(
                    event = TurnEvent::TranscriptPersistFailed.as_str(),
                    session_id = %activity.session_id,
                    message_id = %activity.id,
                    error = %format!("{error:#}"),
                    "transcript persistence failed; skipping"
                ),
            }
        }
        Ok(())
    }
}
