//! Dialog stack runtime and the concrete dialogs that run on it.
//!
//! The runtime is a tagged-variant machine over two dialog kinds (the
//! booking waterfall and the date resolver) rather than an open dialog
//! hierarchy: each frame records which dialog it is, the current step
//! index, the options payload handed over at push time, and the prompt the
//! step is waiting on, so a session can be frozen to storage between turns
//! and resumed on any process.

pub mod booking;
pub mod date_resolver;
pub mod interruption;
pub mod stack;

use serde::{Deserialize, Serialize};

use booking::SlotRecord;

/// Which leg of the trip a date resolver run is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outbound,
    Return,
}

/// Options payload for the date resolver sub-dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverOptions {
    /// Date expression carried in from the slot record, if any.
    pub expression: Option<String>,
    /// Leg being resolved; selects the question wording.
    pub direction: Direction,
}

/// Identifies a concrete dialog kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogKind {
    Booking,
    DateResolver,
}

impl DialogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Booking => "booking",
            Self::DateResolver => "date_resolver",
        }
    }
}

/// Options handed to a dialog when it is pushed onto the stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogOptions {
    Booking(SlotRecord),
    DateResolver(ResolverOptions),
}

impl DialogOptions {
    pub fn kind(&self) -> DialogKind {
        match self {
            Self::Booking(_) => DialogKind::Booking,
            Self::DateResolver(_) => DialogKind::DateResolver,
        }
    }
}

/// How a pending prompt's reply is validated before the dialog advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    /// Free text, always valid.
    Text,
    /// Yes/no choice.
    Confirm,
    /// Must name an exact calendar day.
    TravelDate,
}

/// Prompt a suspended step is waiting on. Persisted with the frame so the
/// question can be re-sent verbatim on "help" and validated on resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPrompt {
    pub kind: PromptKind,
    pub text: String,
}

/// One dialog stack frame: `(dialog, step, options)` plus prompt metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub kind: DialogKind,
    pub step: usize,
    pub options: DialogOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingPrompt>,
}

impl Frame {
    pub fn new(options: DialogOptions) -> Self {
        Self {
            kind: options.kind(),
            step: 0,
            options,
            pending: None,
        }
    }
}

/// Value flowing into a step: the previous step's result, a validated
/// prompt reply, or a finished child dialog's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepValue {
    /// No result (dialog entry, or a child that ended without one).
    None,
    /// Free-text reply or echoed slot value.
    Text(String),
    /// Day-precise ISO date.
    Date(String),
    /// Confirmation choice.
    Confirm(bool),
    /// A completed slot record.
    Record(SlotRecord),
}

impl StepValue {
    /// The textual payload, when the value carries one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::Date(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Control directive returned by a step function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Suspend the turn and wait for the next inbound message.
    Prompt(PendingPrompt),
    /// Advance synchronously to this dialog's next step.
    Next(StepValue),
    /// Push a child dialog; does not consume a turn.
    Begin(DialogOptions),
    /// Pop this dialog, delivering the result to the parent's next step.
    End(Option<StepValue>),
}
