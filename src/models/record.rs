//! Session outcomes and the records persisted for history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::breath::Pattern;
use super::grounding::{GroundingResult, GroundingStepResponse};

/// Which exercise a session or tool belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exercise {
    Breath,
    Grounding,
}

impl Exercise {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breath => "breath",
            Self::Grounding => "grounding",
        }
    }
}

impl std::fmt::Display for Exercise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a finished breathing session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathResult {
    pub pattern: Pattern,
    /// Wall-clock seconds between start and completion
    pub duration: u32,
    pub completed_cycles: u32,
}

/// Outcome of either exercise, tagged by exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "exercise", rename_all = "lowercase")]
pub enum SessionResult {
    Breath(BreathResult),
    Grounding(GroundingResult),
}

impl SessionResult {
    /// One-sentence summary handed to the agent when a session completes
    pub fn summary(&self) -> String {
        match self {
            Self::Breath(result) => format!(
                "Breathing exercise completed: {} cycles of {} pattern in {} minutes.",
                result.completed_cycles,
                result.pattern,
                (result.duration as f64 / 60.0).round() as u32
            ),
            Self::Grounding(result) => {
                let parts: Vec<String> = result
                    .filled_counts()
                    .into_iter()
                    .map(|(category, count)| format!("{} {}", count, category))
                    .collect();
                format!("Grounding exercise completed. I identified: {}.", parts.join(", "))
            }
        }
    }
}

/// Persisted breathing session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathSessionRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub completed: bool,
    /// Target seconds for completed sessions, elapsed seconds for aborted ones
    pub duration: u32,
    pub pattern: Pattern,
}

impl BreathSessionRecord {
    pub fn completed(pattern: Pattern, target_secs: u32) -> Self {
        Self {
            id: None,
            timestamp: Utc::now(),
            completed: true,
            duration: target_secs,
            pattern,
        }
    }

    pub fn aborted(pattern: Pattern, elapsed_secs: u32) -> Self {
        Self {
            id: None,
            timestamp: Utc::now(),
            completed: false,
            duration: elapsed_secs,
            pattern,
        }
    }
}

/// Persisted grounding session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSessionRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub responses: Vec<GroundingStepResponse>,
}

impl From<&GroundingResult> for GroundingSessionRecord {
    fn from(result: &GroundingResult) -> Self {
        Self {
            id: None,
            timestamp: Utc::now(),
            responses: result.responses.clone(),
        }
    }
}

/// History summary shown with breathing history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathStats {
    pub total: usize,
    pub completed: usize,
}

impl BreathStats {
    pub fn from_records(records: &[BreathSessionRecord]) -> Self {
        Self {
            total: records.len(),
            completed: records.iter().filter(|r| r.completed).count(),
        }
    }
}
