//! Date resolver sub-dialog: decides whether a date expression names an
//! exact calendar day, prompting follow-up questions until it does.

use crate::turn::TurnContext;

use super::{PendingPrompt, PromptKind, ResolverOptions, StepOutcome, StepValue};

/// Corrective message for input that lacks day-level precision. Sent alone,
/// without advancing; the user may retry indefinitely.
pub const AMBIGUOUS_DATE_RETRY: &str =
    "I'm sorry, for best results, please enter your travel date including the month, day and year.";

/// Question wording keyed by travel direction.
pub fn question(direction: super::Direction) -> &'static str {
    match direction {
        super::Direction::Outbound => "On what date would you like to travel in?",
        super::Direction::Return => "On what date would you like to travel back?",
    }
}

/// Run one resolver step. Step 0 ends immediately for a day-precise
/// expression and prompts otherwise; step 1 surfaces the validated date.
pub(crate) fn run_step(
    options: &ResolverOptions,
    step: usize,
    incoming: StepValue,
    _ctx: &mut TurnContext,
) -> StepOutcome {
    match step {
        0 => {
            if let Some(expression) = options.expression.as_deref()
                && let Some(normalized) = voyage_timex::definite_date(expression)
            {
                return StepOutcome::End(Some(StepValue::Date(normalized)));
            }
            StepOutcome::Prompt(PendingPrompt {
                kind: PromptKind::TravelDate,
                text: question(options.direction).to_string(),
            })
        }
        _ => match incoming {
            StepValue::Date(date) => StepOutcome::End(Some(StepValue::Date(date))),
            other => {
                tracing::warn!(value = ?other, "date resolver resumed without a date; ending");
                StepOutcome::End(None)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::super::Direction;
    use super::*;
    use crate::turn::TurnContext;

    fn resolver(expression: Option<&str>, direction: Direction) -> ResolverOptions {
        ResolverOptions {
            expression: expression.map(str::to_string),
            direction,
        }
    }

    #[test]
    fn definite_expression_ends_immediately_normalized() {
        let mut ctx = TurnContext::new();
        let outcome = run_step(
            &resolver(Some("mar 23 2021"), Direction::Outbound),
            0,
            StepValue::None,
            &mut ctx,
        );
        assert_eq!(
            outcome,
            StepOutcome::End(Some(StepValue::Date("2021-03-23".to_string())))
        );
    }

    #[test]
    fn missing_expression_prompts_by_direction() {
        let mut ctx = TurnContext::new();
        let outbound = run_step(&resolver(None, Direction::Outbound), 0, StepValue::None, &mut ctx);
        assert_eq!(
            outbound,
            StepOutcome::Prompt(PendingPrompt {
                kind: PromptKind::TravelDate,
                text: "On what date would you like to travel in?".to_string(),
            })
        );
        let back = run_step(&resolver(None, Direction::Return), 0, StepValue::None, &mut ctx);
        assert_eq!(
            back,
            StepOutcome::Prompt(PendingPrompt {
                kind: PromptKind::TravelDate,
                text: "On what date would you like to travel back?".to_string(),
            })
        );
    }

    #[test]
    fn ambiguous_expression_prompts_instead_of_accepting() {
        let mut ctx = TurnContext::new();
        let outcome = run_step(
            &resolver(Some("mar 23"), Direction::Outbound),
            0,
            StepValue::None,
            &mut ctx,
        );
        assert!(matches!(outcome, StepOutcome::Prompt(_)));
    }

    #[test]
    fn second_step_surfaces_the_validated_date() {
        let mut ctx = TurnContext::new();
        let outcome = run_step(
            &resolver(None, Direction::Return),
            1,
            StepValue::Date("2021-04-15".to_string()),
            &mut ctx,
        );
        assert_eq!(
            outcome,
            StepOutcome::End(Some(StepValue::Date("2021-04-15".to_string())))
        );
    }
}
