//! Dialog stack runtime: resumes the stored frame, validates pending
//! prompts, runs step functions, and routes child-dialog results back to
//! the step that pushed them.

use crate::observability::TurnEvent;
use crate::turn::TurnContext;

use super::interruption::{self, Interruption};
use super::{booking, date_resolver};
use super::{DialogOptions, Frame, PendingPrompt, PromptKind, StepOutcome, StepValue};

/// What the dispatch loop left behind for the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Suspended at a prompt; the stack awaits the next inbound message.
    Waiting,
    /// The stack emptied; the top-level dialog's result, if any.
    Finished(Option<StepValue>),
    /// The user cancelled; the stack was unwound.
    Cancelled,
    /// `resume` was called with an empty stack; nothing happened.
    EmptyStack,
}

/// Push a new dialog and run it until it prompts or finishes.
pub fn begin(stack: &mut Vec<Frame>, options: DialogOptions, ctx: &mut TurnContext) -> DispatchOutcome {
    tracing::debug!(
        event = TurnEvent::DialogBegan.as_str(),
        dialog = options.kind().as_str(),
        depth = stack.len() + 1,
        "dialog began"
    );
    stack.push(Frame::new(options));
    drive(stack, StepValue::None, ctx)
}

/// Resume the top frame with inbound user text. Interruption keywords are
/// checked first, before any prompt validation or slot parsing.
pub fn resume(stack: &mut Vec<Frame>, text: &str, ctx: &mut TurnContext) -> DispatchOutcome {
    if stack.is_empty() {
        return DispatchOutcome::EmptyStack;
    }

    match interruption::detect(text) {
        Some(Interruption::Cancel) => {
            tracing::info!(
                event = TurnEvent::InterruptionCancel.as_str(),
                depth = stack.len(),
                "cancel interruption; unwinding dialog stack"
            );
            unwind(stack);
            ctx.send_notice(interruption::CANCEL_NOTICE);
            return DispatchOutcome::Cancelled;
        }
        Some(Interruption::Help) => {
            tracing::info!(event = TurnEvent::InterruptionHelp.as_str(), "help interruption");
            ctx.send_notice(interruption::HELP_TEXT);
            if let Some(pending) = stack.last().and_then(|frame| frame.pending.clone()) {
                ctx.send_prompt(pending.text);
            }
            return DispatchOutcome::Waiting;
        }
        None => {}
    }

    let Some(frame) = stack.last_mut() else {
        return DispatchOutcome::EmptyStack;
    };
    match frame.pending.take() {
        Some(pending) => match validate_reply(&pending, text) {
            Ok(value) => {
                frame.step += 1;
                drive(stack, value, ctx)
            }
            Err(retry) => {
                tracing::debug!(
                    event = TurnEvent::PromptRetried.as_str(),
                    prompt = ?pending.kind,
                    "prompt reply rejected; re-prompting"
                );
                frame.pending = Some(pending);
                ctx.send_prompt(retry);
                DispatchOutcome::Waiting
            }
        },
        // No recorded prompt (state written by an older process mid-turn):
        // hand the raw text to the current step.
        None => drive(stack, StepValue::Text(text.to_string()), ctx),
    }
}

/// Pop every frame with a null result.
fn unwind(stack: &mut Vec<Frame>) {
    while let Some(frame) = stack.pop() {
        tracing::debug!(
            event = TurnEvent::DialogEnded.as_str(),
            dialog = frame.kind.as_str(),
            step = frame.step,
            cancelled = true,
            "dialog ended"
        );
    }
    tracing::debug!(event = TurnEvent::StackUnwound.as_str(), "dialog stack unwound");
}

/// Validate a pending prompt's reply. `Err` carries the corrective message
/// to send; the step index must not advance in that case.
fn validate_reply(pending: &PendingPrompt, text: &str) -> Result<StepValue, &'static str> {
    match pending.kind {
        PromptKind::Text => Ok(StepValue::Text(text.trim().to_string())),
        PromptKind::Confirm => parse_confirm(text)
            .map(StepValue::Confirm)
            .ok_or(booking::CONFIRM_RETRY),
        PromptKind::TravelDate => voyage_timex::definite_date(text)
            .map(StepValue::Date)
            .ok_or(date_resolver::AMBIGUOUS_DATE_RETRY),
    }
}

/// Yes/no recognizer for the confirmation prompt.
fn parse_confirm(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "yeah" | "yep" | "sure" | "ok" | "okay" | "confirm" | "1" | "(1)" => {
            Some(true)
        }
        "no" | "n" | "nope" | "2" | "(2)" => Some(false),
        _ => None,
    }
}

/// Step-dispatch loop: runs steps synchronously until a prompt suspends the
/// turn or the stack empties.
fn drive(stack: &mut Vec<Frame>, mut incoming: StepValue, ctx: &mut TurnContext) -> DispatchOutcome {
    loop {
        let Some(frame) = stack.last_mut() else {
            return DispatchOutcome::Finished(None);
        };
        let outcome = match &mut frame.options {
            DialogOptions::Booking(record) => booking::run_step(record, frame.step, incoming, ctx),
            DialogOptions::DateResolver(options) => {
                date_resolver::run_step(options, frame.step, incoming, ctx)
            }
        };
        match outcome {
            StepOutcome::Prompt(pending) => {
                tracing::debug!(
                    event = TurnEvent::PromptSent.as_str(),
                    dialog = frame.kind.as_str(),
                    step = frame.step,
                    prompt = ?pending.kind,
                    "prompt sent"
                );
                ctx.send_prompt(pending.text.clone());
                frame.pending = Some(pending);
                return DispatchOutcome::Waiting;
            }
            StepOutcome::Next(value) => {
                frame.step += 1;
                incoming = value;
            }
            StepOutcome::Begin(options) => {
                tracing::debug!(
                    event = TurnEvent::DialogBegan.as_str(),
                    dialog = options.kind().as_str(),
                    depth = stack.len() + 1,
                    "dialog began"
                );
                stack.push(Frame::new(options));
                incoming = StepValue::None;
            }
            StepOutcome::End(result) => {
                let ended = stack.pop();
                if let Some(frame) = ended {
                    tracing::debug!(
                        event = TurnEvent::DialogEnded.as_str(),
                        dialog = frame.kind.as_str(),
                        step = frame.step,
                        "dialog ended"
                    );
                }
                match stack.last_mut() {
                    Some(parent) => {
                        // The child's result becomes the previous-step
                        // result of the step after the one that pushed it.
                        parent.step += 1;
                        incoming = result.unwrap_or(StepValue::None);
                    }
                    None => return DispatchOutcome::Finished(result),
                }
            }
        }
    }
}
