use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use super::*;
use crate::exercise::{ManualClock, ManualScheduler};
use crate::models::{
    BreathSessionRecord, Exercise, GroundingSessionRecord, Locale, Pattern, Phase, SessionResult,
};
use crate::storage::{SessionStore, SqliteStore, StorageError};

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<CalmEvent>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<CalmEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: CalmEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Store whose every call fails
struct FailingStore;

impl<R> SessionStore<R> for FailingStore {
    fn save(&self, _record: &R) -> Result<i64, StorageError> {
        Err(StorageError::LockError)
    }

    fn list(&self) -> Result<Vec<R>, StorageError> {
        Err(StorageError::LockError)
    }

    fn delete(&self, _id: i64) -> Result<(), StorageError> {
        Err(StorageError::LockError)
    }
}

/// Counts calls that went through the interactive scope
#[derive(Default)]
struct CountingInteraction {
    calls: Mutex<Vec<ToolName>>,
}

impl AgentInteraction for CountingInteraction {
    fn request_user_interaction(
        &self,
        tool: ToolName,
        run: &mut dyn FnMut() -> ToolResult,
    ) -> ToolResult {
        self.calls.lock().unwrap().push(tool);
        run()
    }
}

struct Fixture {
    hub: ExerciseHub,
    clock: ManualClock,
    scheduler: ManualScheduler,
    published: PublishedTools,
    sink: Arc<RecordingSink>,
    store: SqliteStore,
}

impl Fixture {
    fn new() -> Self {
        let store = SqliteStore::in_memory().unwrap();
        Self::with_stores(Arc::new(store.clone()), Arc::new(store.clone()), store)
    }

    fn failing() -> Self {
        let store = SqliteStore::in_memory().unwrap();
        Self::with_stores(Arc::new(FailingStore), Arc::new(FailingStore), store)
    }

    fn with_stores(
        breath_store: Arc<dyn SessionStore<BreathSessionRecord>>,
        grounding_store: Arc<dyn SessionStore<GroundingSessionRecord>>,
        store: SqliteStore,
    ) -> Self {
        let clock = ManualClock::new();
        let scheduler = ManualScheduler::new();
        let published = PublishedTools::new();
        let sink = Arc::new(RecordingSink::default());

        let hub = ExerciseHub::new(HubServices {
            clock: Arc::new(clock.clone()),
            scheduler: Arc::new(scheduler.clone()),
            context: Arc::new(published.clone()),
            events: sink.clone(),
            breath_store,
            grounding_store,
            locale: Locale::En,
        });

        Self {
            hub,
            clock,
            scheduler,
            published,
            sink,
            store,
        }
    }

    fn call(&mut self, name: &str, args: Value) -> ToolResult {
        self.hub.call_tool(name, args, &DirectInteraction)
    }

    /// Published tool names minus the hub tools
    fn screen_tools(&self) -> Vec<String> {
        self.published
            .names()
            .into_iter()
            .filter(|name| name != "open_calm" && name != "send_guidance")
            .collect()
    }

    fn open(&mut self, exercise: &str) {
        let result = self.call("open_calm", json!({ "exercise": exercise }));
        assert!(!result.is_error, "{}", result.first_text());
    }

    /// Tick once a second until the breathing session stops running
    fn run_breath(&mut self, max_secs: u32) {
        for _ in 0..max_secs {
            self.clock.advance_secs(1);
            if !self.hub.tick() {
                return;
            }
        }
    }
}

fn responses(values: &[&str]) -> Value {
    json!({ "responses": values })
}

const FULL_STEPS: [&[&str]; 5] = [
    &["desk lamp", "window", "bookshelf", "coffee mug", "keyboard"],
    &["warm cup", "soft blanket", "cool desk", "smooth phone"],
    &["bird song", "fan humming", "distant traffic"],
    &["fresh coffee", "morning air"],
    &["green tea"],
];

#[test]
fn test_initial_context_has_only_hub_tools() {
    let fixture = Fixture::new();
    assert_eq!(fixture.published.version(), 1);
    assert_eq!(
        fixture.published.names(),
        vec!["open_calm".to_string(), "send_guidance".to_string()]
    );
}

#[test]
fn test_open_grounding_publishes_start_screen() {
    let mut fixture = Fixture::new();
    fixture.open("grounding");

    assert_eq!(fixture.hub.live_exercise(), Some(Exercise::Grounding));
    assert_eq!(
        fixture.screen_tools(),
        vec!["start-grounding-session", "get-grounding-history"]
    );
    assert_eq!(fixture.published.version(), 2);
}

#[test]
fn test_grounding_flow_through_tools() {
    let mut fixture = Fixture::new();
    fixture.open("grounding");

    let result = fixture.call("start-grounding-session", Value::Null);
    assert_eq!(
        result.first_text(),
        "Grounding session started. Step 1 of 5: 5 things you can see. Provide 5 responses."
    );
    assert_eq!(
        fixture.screen_tools(),
        vec!["submit-grounding-step", "get-grounding-status", "cancel-grounding-session"]
    );

    let result = fixture.call("submit-grounding-step", responses(&["desk", "", "", "", ""]));
    assert!(!result.is_error);
    assert_eq!(
        result.first_text(),
        "Step 1 recorded. Next: Step 2 of 5: 4 things you can touch. Provide 4 responses."
    );

    let status: Value =
        serde_json::from_str(fixture.call("get-grounding-status", Value::Null).first_text()).unwrap();
    assert_eq!(status["currentStep"], 1);
    assert_eq!(status["category"], "touch");

    for step in &FULL_STEPS[1..] {
        let result = fixture.call("submit-grounding-step", responses(step));
        assert!(!result.is_error, "{}", result.first_text());
    }

    assert_eq!(fixture.hub.grounding().screen(), GroundingScreen::Complete);
    assert_eq!(
        fixture.screen_tools(),
        vec!["get-grounding-history", "finish-grounding"]
    );

    let saved: Vec<GroundingSessionRecord> = fixture.store.list().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].responses[0].data, vec!["desk", "", "", "", ""]);
    assert_eq!(saved[0].responses[4].title, "1 thing you can taste");

    let completions = fixture
        .sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, CalmEvent::SessionComplete { .. }))
        .count();
    assert_eq!(completions, 1);

    let result = fixture.call("finish-grounding", Value::Null);
    assert!(!result.is_error);
    assert_eq!(fixture.hub.grounding().screen(), GroundingScreen::Start);
}

#[test]
fn test_all_blank_step_rejected_with_transient_message() {
    let mut fixture = Fixture::new();
    fixture.open("grounding");
    fixture.call("start-grounding-session", Value::Null);
    fixture.call("submit-grounding-step", responses(FULL_STEPS[0]));
    fixture.call("submit-grounding-step", responses(FULL_STEPS[1]));

    let result = fixture.call("submit-grounding-step", responses(&["", "", ""]));
    assert!(result.is_error);
    assert_eq!(result.first_text(), "Please enter at least one item");
    assert_eq!(fixture.hub.grounding().status().current_step, Some(2));
    assert_eq!(
        fixture.hub.grounding().validation_message(),
        Some("Please enter at least one item")
    );

    fixture.clock.advance_secs(2);
    assert!(fixture.hub.grounding().validation_message().is_some());
    fixture.clock.advance_secs(1);
    assert_eq!(fixture.hub.grounding().validation_message(), None);
}

#[test]
fn test_wrong_count_is_descriptive_and_does_not_mutate() {
    let mut fixture = Fixture::new();
    fixture.open("grounding");
    fixture.call("start-grounding-session", Value::Null);
    fixture.call("submit-grounding-step", responses(FULL_STEPS[0]));

    let result = fixture.call("submit-grounding-step", responses(&["cup", "desk"]));
    assert!(result.is_error);
    assert!(result.first_text().contains("expects 4 responses, got 2"));
    assert_eq!(fixture.hub.grounding().status().completed_steps, 1);
}

#[test]
fn test_missing_arguments_are_reported() {
    let mut fixture = Fixture::new();
    fixture.open("grounding");
    fixture.call("start-grounding-session", Value::Null);

    let result = fixture.call("submit-grounding-step", json!({}));
    assert!(result.is_error);
    assert!(result.first_text().starts_with("Invalid arguments for submit-grounding-step"));
}

#[test]
fn test_unavailable_tool_lists_available_tools() {
    let mut fixture = Fixture::new();
    fixture.open("grounding");

    let result = fixture.call("submit-grounding-step", responses(FULL_STEPS[0]));
    assert!(result.is_error);
    assert!(result.first_text().contains("is not available"));
    assert!(result.first_text().contains("start-grounding-session"));
    assert_eq!(fixture.hub.grounding().screen(), GroundingScreen::Start);

    let result = fixture.call("does-not-exist", Value::Null);
    assert!(result.is_error);
}

#[test]
fn test_cancel_requires_confirmation() {
    let mut fixture = Fixture::new();
    fixture.open("grounding");
    fixture.call("start-grounding-session", Value::Null);
    fixture.call("submit-grounding-step", responses(FULL_STEPS[0]));

    let result = fixture.call("cancel-grounding-session", json!({}));
    assert!(!result.is_error);
    assert!(result.first_text().contains("confirmed: true"));
    assert_eq!(fixture.hub.grounding().screen(), GroundingScreen::Step);

    let result = fixture.call("cancel-grounding-session", json!({ "confirmed": true }));
    assert!(!result.is_error);
    assert_eq!(fixture.hub.grounding().screen(), GroundingScreen::Start);
    assert!(fixture
        .sink
        .events()
        .contains(&CalmEvent::SessionAbort { reason: "user_cancelled".to_string() }));

    let saved: Vec<GroundingSessionRecord> = fixture.store.list().unwrap();
    assert!(saved.is_empty());
}

#[test]
fn test_history_screen_delete_and_close() {
    let mut fixture = Fixture::new();
    fixture.open("grounding");
    fixture.call("start-grounding-session", Value::Null);
    for step in FULL_STEPS {
        fixture.call("submit-grounding-step", responses(step));
    }
    fixture.call("finish-grounding", Value::Null);

    let result = fixture.call("get-grounding-history", Value::Null);
    let history: Value = serde_json::from_str(result.first_text()).unwrap();
    let id = history[0]["id"].as_i64().unwrap();
    assert_eq!(fixture.hub.grounding().screen(), GroundingScreen::History);
    assert_eq!(
        fixture.screen_tools(),
        vec!["get-grounding-history", "delete-grounding-session", "close-grounding-history"]
    );

    let result = fixture.call("delete-grounding-session", json!({ "id": id }));
    assert!(result.first_text().contains("Delete this record?"));
    assert_eq!(fixture.hub.grounding().history().unwrap().len(), 1);

    let result = fixture.call("delete-grounding-session", json!({ "id": id, "confirmed": true }));
    assert!(!result.is_error, "{}", result.first_text());
    assert!(fixture.hub.grounding().history().unwrap().is_empty());

    let result = fixture.call("delete-grounding-session", json!({ "id": id, "confirmed": true }));
    assert!(result.is_error);

    fixture.call("close-grounding-history", Value::Null);
    assert_eq!(fixture.hub.grounding().screen(), GroundingScreen::Start);
}

#[test]
fn test_grounding_completes_when_store_fails() {
    let mut fixture = Fixture::failing();
    fixture.open("grounding");
    fixture.call("start-grounding-session", Value::Null);
    let mut last = ToolResult::text("");
    for step in FULL_STEPS {
        last = fixture.call("submit-grounding-step", responses(step));
    }

    assert!(!last.is_error);
    assert!(last.first_text().starts_with("All 5 steps completed."));
    assert_eq!(fixture.hub.grounding().screen(), GroundingScreen::Complete);

    let result = fixture.call("get-grounding-history", Value::Null);
    assert!(result.is_error);
}

#[test]
fn test_breath_session_runs_to_completion() {
    let mut fixture = Fixture::new();
    let result = fixture.call(
        "open_calm",
        json!({ "exercise": "breath", "config": { "pattern": "555", "duration": 60 } }),
    );
    assert_eq!(
        result.first_text(),
        "Opening breath exercise with config: {\"pattern\":\"555\",\"duration\":60}..."
    );
    assert_eq!(
        fixture.screen_tools(),
        vec!["start-breathing-session", "get-breathing-history"]
    );

    let result = fixture.call("start-breathing-session", Value::Null);
    assert!(!result.is_error, "{}", result.first_text());
    assert_eq!(fixture.scheduler.active(), 1);
    assert_eq!(
        fixture.screen_tools(),
        vec!["get-breathing-status", "stop-breathing-session"]
    );

    fixture.run_breath(120);

    assert_eq!(fixture.scheduler.active(), 0);
    assert_eq!(fixture.hub.breath().status().phase, Phase::Complete);
    assert_eq!(fixture.hub.breath().last_result().unwrap().completed_cycles, 4);
    assert_eq!(
        fixture.screen_tools(),
        vec!["get-breathing-status", "get-breathing-history", "finish-breathing"]
    );

    let saved: Vec<BreathSessionRecord> = fixture.store.list().unwrap();
    assert_eq!(saved.len(), 1);
    assert!(saved[0].completed);
    assert_eq!(saved[0].duration, 60);
    assert_eq!(saved[0].pattern, Pattern::RelaxedTriad);

    let summary = fixture.sink.events().into_iter().find_map(|e| match e {
        CalmEvent::SessionComplete { result } => Some(result.summary()),
        _ => None,
    });
    assert_eq!(
        summary.as_deref(),
        Some("Breathing exercise completed: 4 cycles of 555 pattern in 1 minutes.")
    );

    fixture.call("finish-breathing", Value::Null);
    assert_eq!(fixture.hub.breath().status().phase, Phase::Idle);
}

#[test]
fn test_breath_phase_changes_are_published() {
    let mut fixture = Fixture::new();
    fixture.open("breath");
    fixture.call("start-breathing-session", json!({ "pattern": "478", "duration": 60 }));
    fixture.clock.advance_secs(4);
    fixture.hub.tick();

    let phases: Vec<Phase> = fixture
        .sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            CalmEvent::PhaseChange { phase } => Some(phase),
            _ => None,
        })
        .collect();
    assert_eq!(phases, vec![Phase::Inhale]);

    // Countdown runs down one per tick regardless of how late the tick is
    for _ in 0..3 {
        fixture.clock.advance_secs(1);
        fixture.hub.tick();
    }
    assert_eq!(fixture.hub.breath().status().phase, Phase::Hold);
}

#[test]
fn test_stop_records_aborted_session_and_releases_tick() {
    let mut fixture = Fixture::new();
    fixture.open("breath");
    fixture.call("start-breathing-session", json!({ "duration": 180 }));
    for _ in 0..20 {
        fixture.clock.advance_secs(1);
        fixture.hub.tick();
    }

    let result = fixture.call("stop-breathing-session", Value::Null);
    assert!(!result.is_error);
    assert_eq!(fixture.scheduler.active(), 0);
    assert_eq!(fixture.hub.breath().status().phase, Phase::Idle);

    let saved: Vec<BreathSessionRecord> = fixture.store.list().unwrap();
    assert_eq!(saved.len(), 1);
    assert!(!saved[0].completed);
    assert_eq!(saved[0].duration, 20);

    // A late tick after stop must not revive anything
    fixture.clock.advance_secs(1);
    assert!(!fixture.hub.tick());
    assert_eq!(fixture.hub.breath().status().phase, Phase::Idle);
}

#[test]
fn test_breath_selection_locked_while_running() {
    let mut fixture = Fixture::new();
    fixture.open("breath");
    fixture.call("start-breathing-session", Value::Null);

    let result = fixture.call(
        "open_calm",
        json!({ "exercise": "breath", "config": { "pattern": "478" } }),
    );
    assert!(result.is_error);
    assert_eq!(fixture.hub.breath().status().pattern, Pattern::RelaxedTriad);
}

#[test]
fn test_rejected_open_leaves_everything_untouched() {
    let mut fixture = Fixture::new();
    fixture.open("grounding");
    fixture.call("start-grounding-session", Value::Null);
    fixture.open("breath");
    fixture.call("start-breathing-session", Value::Null);
    let version = fixture.published.version();

    let result = fixture.call(
        "open_calm",
        json!({ "exercise": "grounding", "config": { "locale": "ja" } }),
    );
    assert!(result.is_error);
    assert!(result.first_text().contains("Cannot change language"));

    let result = fixture.call(
        "open_calm",
        json!({ "exercise": "grounding", "config": { "duration": 0 } }),
    );
    assert!(result.is_error);

    assert_eq!(fixture.hub.live_exercise(), Some(Exercise::Breath));
    assert!(fixture.hub.breath().is_running());
    assert_eq!(fixture.scheduler.active(), 1);
    assert_eq!(fixture.hub.grounding().locale(), Locale::En);
    assert!(SessionStore::<BreathSessionRecord>::list(&fixture.store)
        .unwrap()
        .is_empty());
    assert_eq!(fixture.published.version(), version);
}

#[test]
fn test_history_navigation_is_interactive() {
    let mut fixture = Fixture::new();
    fixture.open("grounding");
    let interaction = CountingInteraction::default();

    fixture
        .hub
        .call_tool("get-grounding-history", Value::Null, &interaction);
    assert_eq!(fixture.hub.grounding().screen(), GroundingScreen::History);
    fixture
        .hub
        .call_tool("get-grounding-history", Value::Null, &interaction);

    assert_eq!(
        *interaction.calls.lock().unwrap(),
        vec![ToolName::GetGroundingHistory]
    );
}

#[test]
fn test_failed_history_read_stays_on_start_screen() {
    let mut fixture = Fixture::failing();
    fixture.open("grounding");

    let result = fixture.call("get-grounding-history", Value::Null);

    assert!(result.is_error);
    assert_eq!(fixture.hub.grounding().screen(), GroundingScreen::Start);
    assert_eq!(
        fixture.screen_tools(),
        vec!["start-grounding-session", "get-grounding-history"]
    );
}

#[test]
fn test_invalid_duration_rejected() {
    let mut fixture = Fixture::new();
    fixture.open("breath");

    let result = fixture.call("start-breathing-session", json!({ "duration": 0 }));
    assert!(result.is_error);
    assert_eq!(fixture.scheduler.scheduled(), 0);
    assert_eq!(fixture.hub.breath().status().phase, Phase::Idle);
}

#[test]
fn test_breath_completes_when_store_fails() {
    let mut fixture = Fixture::failing();
    fixture.open("breath");
    fixture.call("start-breathing-session", json!({ "duration": 15 }));
    fixture.run_breath(30);

    assert_eq!(fixture.hub.breath().status().phase, Phase::Complete);
    assert_eq!(fixture.scheduler.active(), 0);
}

#[test]
fn test_switching_exercise_stops_breathing() {
    let mut fixture = Fixture::new();
    fixture.open("breath");
    fixture.call("start-breathing-session", Value::Null);
    fixture.clock.advance_secs(3);
    fixture.hub.tick();

    fixture.open("grounding");

    assert!(!fixture.hub.breath().is_running());
    assert_eq!(fixture.scheduler.active(), 0);
    assert!(fixture
        .sink
        .events()
        .contains(&CalmEvent::SessionAbort { reason: "switched_exercise".to_string() }));
}

#[test]
fn test_only_mutating_calls_are_interactive() {
    let mut fixture = Fixture::new();
    let interaction = CountingInteraction::default();
    fixture
        .hub
        .call_tool("open_calm", json!({ "exercise": "grounding" }), &interaction);
    fixture
        .hub
        .call_tool("start-grounding-session", Value::Null, &interaction);
    fixture
        .hub
        .call_tool("get-grounding-status", Value::Null, &interaction);
    fixture
        .hub
        .call_tool("submit-grounding-step", responses(FULL_STEPS[0]), &interaction);

    assert_eq!(
        *interaction.calls.lock().unwrap(),
        vec![
            ToolName::OpenCalm,
            ToolName::StartGroundingSession,
            ToolName::SubmitGroundingStep
        ]
    );
}

#[test]
fn test_reads_do_not_republish() {
    let mut fixture = Fixture::new();
    fixture.open("grounding");
    fixture.call("start-grounding-session", Value::Null);
    let version = fixture.published.version();

    fixture.call("get-grounding-status", Value::Null);
    fixture.call("submit-grounding-step", responses(FULL_STEPS[0]));

    assert_eq!(fixture.published.version(), version);
}

#[test]
fn test_ui_transitions_republish() {
    let mut fixture = Fixture::new();
    fixture.open("grounding");

    fixture.hub.with_grounding(|g| g.start_session());
    assert_eq!(
        fixture.screen_tools(),
        vec!["submit-grounding-step", "get-grounding-status", "cancel-grounding-session"]
    );

    fixture.hub.with_grounding(|g| g.cancel_session(true));
    assert_eq!(
        fixture.screen_tools(),
        vec!["start-grounding-session", "get-grounding-history"]
    );
}

#[test]
fn test_guidance_visible_for_five_seconds() {
    let mut fixture = Fixture::new();
    let result = fixture.call(
        "send_guidance",
        json!({ "message": "Take your time.", "type": "encouragement" }),
    );
    assert_eq!(
        result.first_text(),
        "Sent encouragement message to UI: \"Take your time.\""
    );

    let guidance = fixture.hub.current_guidance().unwrap();
    assert_eq!(guidance.kind, GuidanceKind::Encouragement);

    fixture.clock.advance_secs(5);
    assert!(fixture.hub.current_guidance().is_none());

    let result = fixture.call("send_guidance", json!({ "message": "   " }));
    assert!(result.is_error);
}

#[test]
fn test_japanese_locale_titles_are_stored() {
    let mut fixture = Fixture::new();
    fixture.call(
        "open_calm",
        json!({ "exercise": "grounding", "config": { "locale": "ja" } }),
    );
    fixture.call("start-grounding-session", Value::Null);
    for step in FULL_STEPS {
        fixture.call("submit-grounding-step", responses(step));
    }

    let saved: Vec<GroundingSessionRecord> = fixture.store.list().unwrap();
    assert_eq!(saved[0].responses[0].title, "見えるもの 5つ");

    match fixture.sink.events().last() {
        Some(CalmEvent::SessionComplete { result: SessionResult::Grounding(result) }) => {
            assert_eq!(result.locale, Locale::Ja);
        }
        other => panic!("expected grounding completion, got {:?}", other),
    }
}
