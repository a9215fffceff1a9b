//! Events published to the agent host

use serde::Serialize;

use crate::models::{Exercise, Phase, SessionResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalmEvent {
    SessionStart { exercise: Exercise },
    PhaseChange { phase: Phase },
    SessionComplete { result: SessionResult },
    SessionAbort { reason: String },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: CalmEvent);
}

/// Writes events to the structured log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, event: CalmEvent) {
        match &event {
            CalmEvent::SessionStart { exercise } => {
                tracing::info!(%exercise, "Session started");
            }
            CalmEvent::PhaseChange { phase } => {
                tracing::debug!(%phase, "Phase changed");
            }
            CalmEvent::SessionComplete { result } => {
                tracing::info!(summary = %result.summary(), "Session completed");
            }
            CalmEvent::SessionAbort { reason } => {
                tracing::info!(%reason, "Session aborted");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BreathResult, Pattern};

    #[test]
    fn test_event_wire_shape() {
        let json = serde_json::to_value(CalmEvent::PhaseChange { phase: Phase::Hold }).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "phase_change", "phase": "hold" }));

        let json = serde_json::to_value(CalmEvent::SessionComplete {
            result: SessionResult::Breath(BreathResult {
                pattern: Pattern::RelaxedTriad,
                duration: 60,
                completed_cycles: 4,
            }),
        })
        .unwrap();
        assert_eq!(json["type"], "session_complete");
        assert_eq!(json["result"]["exercise"], "breath");
        assert_eq!(json["result"]["completedCycles"], 4);
    }
}
