#![allow(missing_docs)]

//! End-to-end booking dialog flows through the engine, with a recognizer
//! stub that returns no entities so every value comes from typed replies.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use voyage_agent::{
    Engine, InboundActivity, RecognizeTurn, RecognizerResult, SessionStateStore, SlotRecognizer,
    SlotRecord, TranscriptArchive, TurnOutput, AMBIGUOUS_DATE_RETRY, BUDGET_PROMPT, CANCEL_NOTICE,
    CONFIRM_AFFORDANCE, CONFIRM_RETRY, DESTINATION_PROMPT, HELP_TEXT, ORIGIN_PROMPT,
};

const TRAVEL_IN_PROMPT: &str = "On what date would you like to travel in?";
const TRAVEL_BACK_PROMPT: &str = "On what date would you like to travel back?";

struct EmptyRecognizer;

#[async_trait]
impl SlotRecognizer for EmptyRecognizer {
    async fn recognize(&self, _turn: &RecognizeTurn) -> Result<RecognizerResult> {
        Ok(RecognizerResult::default())
    }
}

fn engine() -> Engine {
    Engine::with_parts(
        Some(Arc::new(EmptyRecognizer)),
        Arc::new(SessionStateStore::in_memory()),
        Arc::new(TranscriptArchive::in_memory()),
    )
}

static MESSAGE_COUNTER: AtomicU64 = AtomicU64::new(0);

async fn say(engine: &Engine, session_id: &str, text: &str) -> TurnOutput {
    let id = format!("m{}", MESSAGE_COUNTER.fetch_add(1, Ordering::Relaxed));
    engine
        .run_turn(InboundActivity::message(id, session_id, text))
        .await
        .expect("turn should not error")
}

fn texts(output: &TurnOutput) -> Vec<&str> {
    output
        .activities
        .iter()
        .map(|activity| activity.text.as_str())
        .collect()
}

fn expected_confirmation() -> String {
    format!(
        "Please confirm: I have you traveling to Berlin\nfrom Paris on 2021-03-23.\nYour flight back is schedules on 2021-04-15.\nYou want to spend less than: $500.{CONFIRM_AFFORDANCE}"
    )
}

#[tokio::test]
async fn bare_flow_prompts_in_order() {
    let engine = engine();
    let session = "bare-flow";

    assert_eq!(texts(&say(&engine, session, "hi").await), vec![DESTINATION_PROMPT]);
    assert_eq!(texts(&say(&engine, session, "Berlin").await), vec![ORIGIN_PROMPT]);
    assert_eq!(texts(&say(&engine, session, "Paris").await), vec![TRAVEL_IN_PROMPT]);
    // Month-day without a year lacks day precision: corrective message,
    // same question still pending.
    assert_eq!(
        texts(&say(&engine, session, "mar 23").await),
        vec![AMBIGUOUS_DATE_RETRY]
    );
    assert_eq!(
        texts(&say(&engine, session, "mar 23 2021").await),
        vec![TRAVEL_BACK_PROMPT]
    );
    assert_eq!(
        texts(&say(&engine, session, "apr 15 2021").await),
        vec![BUDGET_PROMPT]
    );
    let confirm = say(&engine, session, "$500").await;
    assert_eq!(texts(&confirm), vec![expected_confirmation().as_str()]);

    let done = say(&engine, session, "yes").await;
    assert!(!done.failed);
    let record = done.completed.expect("confirmed booking should surface");
    assert_eq!(record.destination.as_deref(), Some("Berlin"));
    assert_eq!(record.origin.as_deref(), Some("Paris"));
    assert_eq!(record.travel_start_date.as_deref(), Some("2021-03-23"));
    assert_eq!(record.travel_end_date.as_deref(), Some("2021-04-15"));
    assert_eq!(record.budget.as_deref(), Some("$500"));
}

#[tokio::test]
async fn prefilled_details_skip_their_prompts() {
    let engine = engine();
    let session = "prefilled";
    engine
        .seed_booking(
            session,
            SlotRecord {
                destination: Some("Berlin".to_string()),
                travel_start_date: Some("2021-03-23".to_string()),
                ..SlotRecord::default()
            },
        )
        .await
        .unwrap();

    // Destination and start-date prompts are skipped entirely.
    assert_eq!(texts(&say(&engine, session, "hi").await), vec![ORIGIN_PROMPT]);
    assert_eq!(
        texts(&say(&engine, session, "Paris").await),
        vec![TRAVEL_BACK_PROMPT]
    );
    assert_eq!(
        texts(&say(&engine, session, "apr 15 2021").await),
        vec![BUDGET_PROMPT]
    );
    let confirm = say(&engine, session, "$500").await;
    assert_eq!(texts(&confirm), vec![expected_confirmation().as_str()]);
}

#[tokio::test]
async fn fully_specified_record_goes_straight_to_confirmation() {
    let engine = engine();
    let session = "complete";
    engine
        .seed_booking(
            session,
            SlotRecord {
                destination: Some("Berlin".to_string()),
                origin: Some("Paris".to_string()),
                travel_start_date: Some("2021-03-23".to_string()),
                travel_end_date: Some("2021-04-15".to_string()),
                budget: Some("$500".to_string()),
            },
        )
        .await
        .unwrap();

    let output = say(&engine, session, "hi").await;
    assert_eq!(texts(&output), vec![expected_confirmation().as_str()]);
}

#[tokio::test]
async fn seeded_ambiguous_date_is_routed_into_the_resolver() {
    let engine = engine();
    let session = "ambiguous-seed";
    engine
        .seed_booking(
            session,
            SlotRecord {
                destination: Some("Berlin".to_string()),
                origin: Some("Paris".to_string()),
                travel_start_date: Some("mar 23".to_string()),
                ..SlotRecord::default()
            },
        )
        .await
        .unwrap();

    // The stored expression lacks day precision and must not be accepted
    // at face value.
    let output = say(&engine, session, "hi").await;
    assert_eq!(texts(&output), vec![TRAVEL_IN_PROMPT]);
}

#[tokio::test]
async fn cancel_at_a_waterfall_prompt_unwinds_everything() {
    let engine = engine();
    let session = "cancel-waterfall";

    say(&engine, session, "hi").await;
    let cancelled = say(&engine, session, "cancel").await;
    assert_eq!(texts(&cancelled), vec![CANCEL_NOTICE]);
    assert!(cancelled.completed.is_none());
    assert!(!cancelled.failed);

    // The next message starts a fresh booking from the top.
    assert_eq!(texts(&say(&engine, session, "hi").await), vec![DESTINATION_PROMPT]);
}

#[tokio::test]
async fn cancel_inside_the_date_resolver_unwinds_everything() {
    let engine = engine();
    let session = "cancel-resolver";

    say(&engine, session, "hi").await;
    say(&engine, session, "Berlin").await;
    let at_date_prompt = say(&engine, session, "Paris").await;
    assert_eq!(texts(&at_date_prompt), vec![TRAVEL_IN_PROMPT]);

    let cancelled = say(&engine, session, "Cancel").await;
    assert_eq!(texts(&cancelled), vec![CANCEL_NOTICE]);
    assert!(cancelled.completed.is_none());
    assert_eq!(texts(&say(&engine, session, "hi").await), vec![DESTINATION_PROMPT]);
}

#[tokio::test]
async fn help_reprompts_verbatim_without_advancing() {
    let engine = engine();
    let session = "help";

    say(&engine, session, "hi").await;
    say(&engine, session, "Berlin").await;

    let helped = say(&engine, session, "help").await;
    assert_eq!(texts(&helped), vec![HELP_TEXT, ORIGIN_PROMPT]);

    // The step did not advance; the next reply still fills origin.
    assert_eq!(
        texts(&say(&engine, session, "Paris").await),
        vec![TRAVEL_IN_PROMPT]
    );
}

#[tokio::test]
async fn unparseable_confirmation_reply_reprompts() {
    let engine = engine();
    let session = "confirm-retry";
    engine
        .seed_booking(
            session,
            SlotRecord {
                destination: Some("Berlin".to_string()),
                origin: Some("Paris".to_string()),
                travel_start_date: Some("2021-03-23".to_string()),
                travel_end_date: Some("2021-04-15".to_string()),
                budget: Some("$500".to_string()),
            },
        )
        .await
        .unwrap();

    say(&engine, session, "hi").await;
    let retried = say(&engine, session, "maybe").await;
    assert_eq!(texts(&retried), vec![CONFIRM_RETRY]);

    let done = say(&engine, session, "yes").await;
    assert!(done.completed.is_some());
    assert!(!done.failed);
}

#[tokio::test]
async fn declined_confirmation_fails_the_turn_and_persists_the_transcript() {
    let engine = engine();
    let session = "decline";
    engine
        .seed_booking(
            session,
            SlotRecord {
                destination: Some("Berlin".to_string()),
                origin: Some("Paris".to_string()),
                travel_start_date: Some("2021-03-23".to_string()),
                travel_end_date: Some("2021-04-15".to_string()),
                budget: Some("$500".to_string()),
            },
        )
        .await
        .unwrap();

    say(&engine, session, "hi").await;
    let declined = engine
        .run_turn(InboundActivity::message("decline-msg", session, "no"))
        .await
        .unwrap();
    assert!(declined.failed);
    assert!(declined.completed.is_none());

    let transcript = engine
        .persisted_transcript("decline-msg")
        .await
        .unwrap()
        .expect("failed turn must persist the transcript");
    assert_eq!(
        transcript,
        vec![
            "[User]: hi".to_string(),
            format!("[Bot]: {}", expected_confirmation()),
            "[User]: no".to_string(),
            "[Bot]: Alright, I will not book anything.".to_string(),
        ]
    );
}

#[tokio::test]
async fn confirmed_booking_does_not_persist_a_transcript() {
    let engine = engine();
    let session = "confirmed-no-archive";
    engine
        .seed_booking(
            session,
            SlotRecord {
                destination: Some("Berlin".to_string()),
                origin: Some("Paris".to_string()),
                travel_start_date: Some("2021-03-23".to_string()),
                travel_end_date: Some("2021-04-15".to_string()),
                budget: Some("$500".to_string()),
            },
        )
        .await
        .unwrap();

    say(&engine, session, "hi").await;
    let confirmed = engine
        .run_turn(InboundActivity::message("confirm-msg", session, "yes"))
        .await
        .unwrap();
    assert!(!confirmed.failed);
    assert!(engine
        .persisted_transcript("confirm-msg")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn dialog_position_survives_an_engine_restart() {
    let sessions = Arc::new(SessionStateStore::in_memory());
    let archive = Arc::new(TranscriptArchive::in_memory());
    let session = "restart";

    let first = Engine::with_parts(
        Some(Arc::new(EmptyRecognizer)),
        sessions.clone(),
        archive.clone(),
    );
    say(&first, session, "hi").await;
    say(&first, session, "Berlin").await;
    drop(first);

    // A fresh engine over the same store resumes at the origin step.
    let second = Engine::with_parts(Some(Arc::new(EmptyRecognizer)), sessions, archive);
    assert_eq!(
        texts(&say(&second, session, "Paris").await),
        vec![TRAVEL_IN_PROMPT]
    );
}

#[tokio::test]
async fn distinct_sessions_do_not_share_dialog_state() {
    let engine = engine();
    assert_eq!(texts(&say(&engine, "s-one", "hi").await), vec![DESTINATION_PROMPT]);
    assert_eq!(texts(&say(&engine, "s-two", "hi").await), vec![DESTINATION_PROMPT]);
    assert_eq!(texts(&say(&engine, "s-one", "Berlin").await), vec![ORIGIN_PROMPT]);
    // Session two is still at the destination step.
    assert_eq!(texts(&say(&engine, "s-two", "Oslo").await), vec![ORIGIN_PROMPT]);
}
