//! Breathing phase engine
//!
//! Drives `inhale -> hold -> exhale -> (inhale | complete)` one tick per
//! second. Elapsed time is always recomputed from the captured start instant,
//! so a missed tick never makes the session run long.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use super::clock::Clock;
use crate::models::{validate_target_secs, BreathResult, Pattern, Phase};
use crate::models::breath::DEFAULT_TARGET_SECS;

/// State change reported by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreathEvent {
    Started { pattern: Pattern, target_secs: u32 },
    PhaseChanged(Phase),
    Completed(BreathResult),
    Aborted { reason: String, elapsed_secs: u32 },
}

/// Read-only view of the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathStatus {
    pub phase: Phase,
    pub pattern: Pattern,
    pub target_duration: u32,
    /// Seconds left in the current phase; absent when not running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown: Option<u32>,
    pub elapsed: u32,
    pub remaining: u32,
    pub completed_cycles: u32,
}

pub struct BreathEngine {
    clock: Arc<dyn Clock>,
    pattern: Pattern,
    target_secs: u32,
    phase: Phase,
    countdown: u32,
    elapsed: u32,
    completed_cycles: u32,
    started_at: Option<Instant>,
}

impl BreathEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            pattern: Pattern::default(),
            target_secs: DEFAULT_TARGET_SECS,
            phase: Phase::Idle,
            countdown: 0,
            elapsed: 0,
            completed_cycles: 0,
            started_at: None,
        }
    }

    /// Begin a session at inhale
    ///
    /// Any previous session state is discarded.
    pub fn start(&mut self, pattern: Pattern, target_secs: u32) -> Vec<BreathEvent> {
        // Callers validate; keep the engine total anyway.
        let target_secs = validate_target_secs(target_secs).unwrap_or(DEFAULT_TARGET_SECS);

        self.pattern = pattern;
        self.target_secs = target_secs;
        self.phase = Phase::Inhale;
        self.countdown = pattern.phase_secs(Phase::Inhale);
        self.elapsed = 0;
        self.completed_cycles = 0;
        self.started_at = Some(self.clock.now());

        vec![
            BreathEvent::Started { pattern, target_secs },
            BreathEvent::PhaseChanged(Phase::Inhale),
        ]
    }

    /// Advance by one tick
    ///
    /// Does nothing unless a session is running.
    pub fn tick(&mut self) -> Vec<BreathEvent> {
        let Some(started_at) = self.started_at else {
            return Vec::new();
        };
        if !self.phase.is_active() {
            return Vec::new();
        }

        let wall_secs = self.clock.now().saturating_duration_since(started_at).as_secs() as u32;
        self.elapsed = wall_secs.min(self.target_secs);

        if self.countdown > 1 {
            self.countdown -= 1;
            return Vec::new();
        }

        match self.phase {
            Phase::Inhale | Phase::Hold => {
                let next = self.phase.next_in_cycle();
                self.enter(next);
                vec![BreathEvent::PhaseChanged(next)]
            }
            Phase::Exhale => {
                self.completed_cycles += 1;
                if wall_secs >= self.target_secs {
                    self.phase = Phase::Complete;
                    self.countdown = 0;
                    self.started_at = None;
                    vec![BreathEvent::Completed(BreathResult {
                        pattern: self.pattern,
                        duration: wall_secs,
                        completed_cycles: self.completed_cycles,
                    })]
                } else {
                    self.enter(Phase::Inhale);
                    vec![BreathEvent::PhaseChanged(Phase::Inhale)]
                }
            }
            Phase::Idle | Phase::Complete => Vec::new(),
        }
    }

    /// Abort a running session and return to idle
    ///
    /// Returns `None` when nothing was running.
    pub fn stop(&mut self, reason: impl Into<String>) -> Option<BreathEvent> {
        if !self.is_running() {
            return None;
        }
        let elapsed_secs = self.elapsed;
        self.clear();
        Some(BreathEvent::Aborted {
            reason: reason.into(),
            elapsed_secs,
        })
    }

    /// Return to idle after completion (or from anywhere, silently)
    pub fn reset(&mut self) {
        self.clear();
    }

    fn clear(&mut self) {
        self.phase = Phase::Idle;
        self.countdown = 0;
        self.elapsed = 0;
        self.completed_cycles = 0;
        self.started_at = None;
    }

    fn enter(&mut self, phase: Phase) {
        // Looked up on every transition
        self.phase = phase;
        self.countdown = self.pattern.phase_secs(phase);
    }

    /// Change pattern/duration for the next session
    ///
    /// Only meaningful while idle; the controller refuses it while running.
    pub fn configure(&mut self, pattern: Pattern, target_secs: u32) {
        self.pattern = pattern;
        self.target_secs = target_secs;
    }

    pub fn is_running(&self) -> bool {
        self.phase.is_active()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    pub fn target_secs(&self) -> u32 {
        self.target_secs
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    /// Countdown for display; zero is shown as nothing
    pub fn countdown_display(&self) -> Option<u32> {
        (self.countdown > 0).then_some(self.countdown)
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed
    }

    pub fn remaining_secs(&self) -> u32 {
        self.target_secs.saturating_sub(self.elapsed)
    }

    pub fn completed_cycles(&self) -> u32 {
        self.completed_cycles
    }

    pub fn status(&self) -> BreathStatus {
        BreathStatus {
            phase: self.phase,
            pattern: self.pattern,
            target_duration: self.target_secs,
            countdown: self.countdown_display(),
            elapsed: self.elapsed,
            remaining: self.remaining_secs(),
            completed_cycles: self.completed_cycles,
        }
    }
}
