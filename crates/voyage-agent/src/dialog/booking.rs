//! Booking waterfall: seven ordered steps that fill the slot record, route
//! ambiguous dates through the resolver sub-dialog, and end on a yes/no
//! confirmation.

use serde::{Deserialize, Serialize};

use crate::observability::TurnEvent;
use crate::turn::TurnContext;

use super::{
    DialogOptions, Direction, PendingPrompt, PromptKind, ResolverOptions, StepOutcome, StepValue,
};

/// The five booking fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Destination,
    Origin,
    TravelStartDate,
    TravelEndDate,
    Budget,
}

impl Slot {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Destination => "destination",
            Self::Origin => "origin",
            Self::TravelStartDate => "travel_start_date",
            Self::TravelEndDate => "travel_end_date",
            Self::Budget => "budget",
        }
    }
}

/// The mutable booking record. A field counts as filled only when present
/// and non-empty; a filled field is never overwritten with an absent value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
}

impl SlotRecord {
    pub fn get(&self, slot: Slot) -> Option<&str> {
        let value = match slot {
            Slot::Destination => &self.destination,
            Slot::Origin => &self.origin,
            Slot::TravelStartDate => &self.travel_start_date,
            Slot::TravelEndDate => &self.travel_end_date,
            Slot::Budget => &self.budget,
        };
        value.as_deref()
    }

    pub fn set(&mut self, slot: Slot, value: String) {
        let field = match slot {
            Slot::Destination => &mut self.destination,
            Slot::Origin => &mut self.origin,
            Slot::TravelStartDate => &mut self.travel_start_date,
            Slot::TravelEndDate => &mut self.travel_end_date,
            Slot::Budget => &mut self.budget,
        };
        *field = Some(value);
    }

    /// Filled means present and non-empty.
    pub fn is_filled(&self, slot: Slot) -> bool {
        self.get(slot).is_some_and(|value| !value.trim().is_empty())
    }
}

pub const DESTINATION_PROMPT: &str = "Where would you like to travel to?";
pub const ORIGIN_PROMPT: &str = "From what city will you be travelling?";
pub const BUDGET_PROMPT: &str = "What is your maximum budget for this trip?";

/// Choice affordance rendered after the confirmation text.
pub const CONFIRM_AFFORDANCE: &str = " (1) Yes or (2) No";

/// Corrective message for an unparseable yes/no reply.
pub const CONFIRM_RETRY: &str = "Please answer with \"yes\" or \"no\".";

/// Notice sent when the user declines the summary.
pub const DECLINED_NOTICE: &str = "Alright, I will not book anything.";

/// Scratch-map capture table: for each step, the slot the *previous* step
/// was filling. The prefill merge reads exactly this key, so reordering
/// steps means editing this table rather than implicit key arithmetic.
const CAPTURES: [Option<Slot>; 7] = [
    None,
    Some(Slot::Destination),
    Some(Slot::Origin),
    Some(Slot::TravelStartDate),
    Some(Slot::TravelEndDate),
    Some(Slot::Budget),
    None,
];

/// Confirmation summary in the exact wire format.
pub fn confirmation_text(record: &SlotRecord) -> String {
    format!(
        "Please confirm: I have you traveling to {}\nfrom {} on {}.\nYour flight back is schedules on {}.\nYou want to spend less than: {}.",
        record.get(Slot::Destination).unwrap_or_default(),
        record.get(Slot::Origin).unwrap_or_default(),
        record.get(Slot::TravelStartDate).unwrap_or_default(),
        record.get(Slot::TravelEndDate).unwrap_or_default(),
        record.get(Slot::Budget).unwrap_or_default(),
    )
}

fn booked_notice(record: &SlotRecord) -> String {
    format!(
        "I have you booked to {} from {} on {}.",
        record.get(Slot::Destination).unwrap_or_default(),
        record.get(Slot::Origin).unwrap_or_default(),
        record.get(Slot::TravelStartDate).unwrap_or_default(),
    )
}

/// A stored date that does not name an exact calendar day must go through
/// the resolver rather than be accepted at face value.
fn is_ambiguous(expression: &str) -> bool {
    !voyage_timex::parse(expression).is_ok_and(|expr| expr.is_definite())
}

/// Merge the scratch-map value for the slot the previous step was filling,
/// falling back to the previous step's direct result. NLU-recognized
/// entities win over a plain echoed prompt reply in the same turn.
fn capture_previous(record: &mut SlotRecord, step: usize, incoming: &StepValue, ctx: &TurnContext) {
    let Some(slot) = CAPTURES.get(step).copied().flatten() else {
        return;
    };
    let value = ctx
        .prefill_value(slot)
        .map(str::to_string)
        .or_else(|| incoming.as_text().map(str::to_string))
        .filter(|value| !value.trim().is_empty());
    if let Some(value) = value {
        record.set(slot, value);
    }
}

/// Run one waterfall step against the slot record.
pub(crate) fn run_step(
    record: &mut SlotRecord,
    step: usize,
    incoming: StepValue,
    ctx: &mut TurnContext,
) -> StepOutcome {
    capture_previous(record, step, &incoming, ctx);

    match step {
        // destination
        0 => prompt_or_next(record, Slot::Destination, DESTINATION_PROMPT),
        // origin
        1 => prompt_or_next(record, Slot::Origin, ORIGIN_PROMPT),
        // travel_start_date
        2 => resolve_or_next(record, Slot::TravelStartDate, Direction::Outbound),
        // travel_end_date
        3 => resolve_or_next(record, Slot::TravelEndDate, Direction::Return),
        // budget
        4 => prompt_or_next(record, Slot::Budget, BUDGET_PROMPT),
        // confirm
        5 => {
            let text = format!("{}{}", confirmation_text(record), CONFIRM_AFFORDANCE);
            StepOutcome::Prompt(PendingPrompt {
                kind: PromptKind::Confirm,
                text,
            })
        }
        // final
        6 => {
            if matches!(incoming, StepValue::Confirm(true)) {
                ctx.failed = false;
                tracing::info!(event = TurnEvent::BookingConfirmed.as_str(), "booking confirmed");
                ctx.send_notice(booked_notice(record));
                StepOutcome::End(Some(StepValue::Record(record.clone())))
            } else {
                ctx.failed = true;
                tracing::info!(event = TurnEvent::BookingDeclined.as_str(), "booking declined");
                ctx.send_notice(DECLINED_NOTICE);
                StepOutcome::End(None)
            }
        }
        out_of_range => {
            tracing::warn!(step = out_of_range, "booking step out of range; ending dialog");
            StepOutcome::End(None)
        }
    }
}

fn prompt_or_next(record: &SlotRecord, slot: Slot, prompt: &str) -> StepOutcome {
    if record.is_filled(slot) {
        let value = record.get(slot).unwrap_or_default().to_string();
        StepOutcome::Next(StepValue::Text(value))
    } else {
        StepOutcome::Prompt(PendingPrompt {
            kind: PromptKind::Text,
            text: prompt.to_string(),
        })
    }
}

fn resolve_or_next(record: &SlotRecord, slot: Slot, direction: Direction) -> StepOutcome {
    let expression = record
        .get(slot)
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string);
    match expression {
        Some(expression) if !is_ambiguous(&expression) => {
            StepOutcome::Next(StepValue::Date(expression))
        }
        expression => StepOutcome::Begin(DialogOptions::DateResolver(ResolverOptions {
            expression,
            direction,
        })),
    }
}
