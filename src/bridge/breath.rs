//! Breathing session controller
//!
//! Owns the [`BreathEngine`] and the tick guard that drives it. Dropping the
//! guard is the only way the tick stops, and every path out of a running
//! session drops it before touching engine state.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::events::{CalmEvent, EventSink};
use super::screens::BreathScreen;
use super::tools::{parse_args, ToolName};
use crate::error::AppError;
use crate::exercise::{BreathEngine, BreathEvent, BreathStatus, Clock, TickHandle, TickScheduler};
use crate::models::{
    format_time, validate_target_secs, BreathResult, BreathSessionRecord, BreathStats, Exercise,
    Pattern, Phase, SessionResult,
};
use crate::storage::SessionStore;

/// Tick period of a running session
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Sessions shown by the history tool
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Default, Deserialize)]
struct StartArgs {
    pattern: Option<Pattern>,
    duration: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct BreathHistory {
    pub stats: BreathStats,
    pub sessions: Vec<BreathSessionRecord>,
}

pub struct BreathController {
    engine: BreathEngine,
    scheduler: Arc<dyn TickScheduler>,
    ticker: Option<TickHandle>,
    store: Arc<dyn SessionStore<BreathSessionRecord>>,
    events: Arc<dyn EventSink>,
    last_result: Option<BreathResult>,
}

impl BreathController {
    pub fn new(
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn TickScheduler>,
        store: Arc<dyn SessionStore<BreathSessionRecord>>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            engine: BreathEngine::new(clock),
            scheduler,
            ticker: None,
            store,
            events,
            last_result: None,
        }
    }

    pub fn screen(&self) -> BreathScreen {
        match self.engine.phase() {
            Phase::Idle => BreathScreen::Idle,
            Phase::Inhale | Phase::Hold | Phase::Exhale => BreathScreen::Running,
            Phase::Complete => BreathScreen::Complete,
        }
    }

    pub fn tools(&self) -> &'static [ToolName] {
        self.screen().tools()
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    /// Whether a tick guard is currently held
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Choose the pattern for the next session; locked while running
    pub fn select_pattern(&mut self, pattern: Pattern) -> Result<(), AppError> {
        self.ensure_not_running("pattern")?;
        self.engine.configure(pattern, self.engine.target_secs());
        Ok(())
    }

    /// Choose the target duration for the next session; locked while running
    pub fn select_duration(&mut self, secs: u32) -> Result<(), AppError> {
        self.ensure_not_running("duration")?;
        let secs = validate_target_secs(secs)?;
        self.engine.configure(self.engine.pattern(), secs);
        Ok(())
    }

    /// Fails when the selection is locked
    pub fn ensure_not_running(&self, what: &str) -> Result<(), AppError> {
        if self.engine.is_running() {
            return Err(AppError::validation(format!(
                "Cannot change the {} while a breathing session is running",
                what
            )));
        }
        Ok(())
    }

    /// Start a session with the selected (or given) pattern and duration
    pub fn start(
        &mut self,
        pattern: Option<Pattern>,
        duration: Option<u32>,
    ) -> Result<BreathStatus, AppError> {
        if self.engine.is_running() {
            return Err(AppError::validation("A breathing session is already running"));
        }
        let pattern = pattern.unwrap_or_else(|| self.engine.pattern());
        let target = match duration {
            Some(secs) => validate_target_secs(secs)?,
            None => self.engine.target_secs(),
        };

        self.ticker = None;
        self.last_result = None;
        let events = self.engine.start(pattern, target);
        self.dispatch(events);
        self.ticker = Some(self.scheduler.schedule(TICK_PERIOD));

        tracing::info!(%pattern, target, "Breathing session started");
        Ok(self.engine.status())
    }

    /// Advance the running session by one tick
    ///
    /// Returns whether the session is still running; the tick source stops
    /// once this is false.
    pub fn tick(&mut self) -> bool {
        if !self.engine.is_running() {
            self.ticker = None;
            return false;
        }
        let events = self.engine.tick();
        self.dispatch(events);
        self.engine.is_running()
    }

    /// Abort the running session
    ///
    /// The session is recorded as not completed with its elapsed seconds.
    /// Returns whether a session was running.
    pub fn stop(&mut self, reason: &str) -> bool {
        self.ticker = None;
        let pattern = self.engine.pattern();
        let Some(event) = self.engine.stop(reason) else {
            return false;
        };
        if let BreathEvent::Aborted { elapsed_secs, .. } = &event {
            self.persist(BreathSessionRecord::aborted(pattern, *elapsed_secs));
        }
        self.dispatch(vec![event]);
        true
    }

    /// Leave the completion screen
    pub fn finish(&mut self) {
        if self.engine.phase() == Phase::Complete {
            self.engine.reset();
            self.last_result = None;
        }
    }

    /// Tear down whatever is running without recording it
    pub fn reset(&mut self) {
        self.ticker = None;
        self.engine.reset();
        self.last_result = None;
    }

    pub fn status(&self) -> BreathStatus {
        self.engine.status()
    }

    pub fn last_result(&self) -> Option<&BreathResult> {
        self.last_result.as_ref()
    }

    /// Recent sessions plus totals over the whole history
    pub fn history(&self) -> Result<BreathHistory, AppError> {
        let mut sessions = self.store.list()?;
        let stats = BreathStats::from_records(&sessions);
        sessions.truncate(HISTORY_LIMIT);
        Ok(BreathHistory { stats, sessions })
    }

    fn dispatch(&mut self, events: Vec<BreathEvent>) {
        for event in events {
            match event {
                BreathEvent::Started { .. } => self.events.emit(CalmEvent::SessionStart {
                    exercise: Exercise::Breath,
                }),
                BreathEvent::PhaseChanged(phase) => {
                    self.events.emit(CalmEvent::PhaseChange { phase })
                }
                BreathEvent::Completed(result) => {
                    self.ticker = None;
                    self.persist(BreathSessionRecord::completed(
                        result.pattern,
                        self.engine.target_secs(),
                    ));
                    self.last_result = Some(result);
                    self.events.emit(CalmEvent::SessionComplete {
                        result: SessionResult::Breath(result),
                    });
                }
                BreathEvent::Aborted { reason, .. } => {
                    self.events.emit(CalmEvent::SessionAbort { reason })
                }
            }
        }
    }

    fn persist(&self, record: BreathSessionRecord) {
        if let Err(e) = self.store.save(&record) {
            tracing::warn!(error = %e, completed = record.completed, "Failed to save breathing session");
        }
    }

    /// Run one breathing tool
    pub fn handle_tool(&mut self, tool: ToolName, args: Value) -> Result<String, AppError> {
        match tool {
            ToolName::StartBreathingSession => {
                let args: StartArgs = parse_args(tool, args)?;
                let status = self.start(args.pattern, args.duration)?;
                Ok(format!(
                    "Breathing session started: {} pattern for {}. Inhale for {} seconds.",
                    status.pattern.display_name(),
                    format_time(status.target_duration),
                    status.countdown.unwrap_or_default()
                ))
            }
            ToolName::StopBreathingSession => {
                if self.stop("user_stopped") {
                    Ok("Breathing session stopped.".to_string())
                } else {
                    Err(AppError::validation("No breathing session is running"))
                }
            }
            ToolName::GetBreathingStatus => Ok(serde_json::to_string_pretty(&self.status())?),
            ToolName::GetBreathingHistory => {
                let history = self.history()?;
                if history.sessions.is_empty() {
                    return Ok("No breathing sessions recorded yet.".to_string());
                }
                Ok(serde_json::to_string_pretty(&history)?)
            }
            ToolName::FinishBreathing => {
                self.finish();
                Ok("Breathing exercise finished. Ready for a new session.".to_string())
            }
            other => Err(AppError::internal(format!(
                "{} is not a breathing tool",
                other
            ))),
        }
    }
}
