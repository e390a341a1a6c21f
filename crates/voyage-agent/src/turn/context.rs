//! Typed per-turn context threaded through the pipeline and the dialog
//! dispatch — the scratch prefill map and the turn outcome flag live here
//! instead of on shared mutable state.

use std::collections::HashMap;

use crate::activity::Activity;
use crate::dialog::booking::{Slot, SlotRecord};

/// Top-scoring NLU intent for the turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TopIntent {
    pub name: String,
    pub score: f64,
}

/// Mutable state scoped to a single turn. Created at the start of pipeline
/// stage 1 and discarded when the turn's response has been produced.
#[derive(Debug, Default)]
pub struct TurnContext {
    /// Scratch map of NLU-extracted field values, keyed by canonical slot.
    pub prefill: HashMap<Slot, String>,
    /// Turn outcome flag: set only on an explicit failure path, read by the
    /// transcript stage after dispatch.
    pub failed: bool,
    /// Top NLU intent, for telemetry.
    pub top_intent: Option<TopIntent>,
    /// Outbound activities in send order.
    pub outbound: Vec<Activity>,
    /// Completed booking surfaced by the top-level dialog, if any.
    pub completed: Option<SlotRecord>,
    /// Index into `outbound` where dispatch began; the transcript stage
    /// captures only activities produced during dispatch.
    pub(crate) capture_from: usize,
}

impl TurnContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a prompt that expects a reply.
    pub fn send_prompt(&mut self, text: impl Into<String>) {
        self.outbound.push(Activity::prompt(text));
    }

    /// Queue a notice that does not expect a reply.
    pub fn send_notice(&mut self, text: impl Into<String>) {
        self.outbound.push(Activity::notice(text));
    }

    /// Non-empty scratch value for a slot, if the recognizer produced one.
    pub fn prefill_value(&self, slot: Slot) -> Option<&str> {
        self.prefill
            .get(&slot)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}
