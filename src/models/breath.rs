//! Breathing exercise domain types
//!
//! Patterns, phases and the fixed per-phase second counts.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Shortest accepted target duration in seconds
pub const MIN_TARGET_SECS: u32 = 1;

/// Longest accepted target duration in seconds
pub const MAX_TARGET_SECS: u32 = 3600;

/// Target durations offered by the UI (1, 3 and 5 minutes)
pub const DURATION_PRESETS: [u32; 3] = [60, 180, 300];

/// Default target duration
pub const DEFAULT_TARGET_SECS: u32 = 180;

/// Breathing pattern
///
/// Serialized with the same short names the UI and agents use ("555", "478").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Pattern {
    /// 5-5-5: balanced, for refreshing
    #[default]
    #[serde(rename = "555")]
    RelaxedTriad,
    /// 4-7-8: calming, before sleep
    #[serde(rename = "478")]
    Sedative,
}

impl Pattern {
    pub const ALL: [Pattern; 2] = [Pattern::RelaxedTriad, Pattern::Sedative];

    /// Short wire name ("555" / "478")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RelaxedTriad => "555",
            Self::Sedative => "478",
        }
    }

    /// Display name ("5-5-5" / "4-7-8")
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::RelaxedTriad => "5-5-5",
            Self::Sedative => "4-7-8",
        }
    }

    pub fn config(&self) -> PatternConfig {
        match self {
            Self::RelaxedTriad => PatternConfig {
                inhale: 5,
                hold: 5,
                exhale: 5,
            },
            Self::Sedative => PatternConfig {
                inhale: 4,
                hold: 7,
                exhale: 8,
            },
        }
    }

    /// Seconds spent in `phase` for this pattern
    ///
    /// `Idle` and `Complete` have no length and return 0.
    pub fn phase_secs(&self, phase: Phase) -> u32 {
        let config = self.config();
        match phase {
            Phase::Inhale => config.inhale,
            Phase::Hold => config.hold,
            Phase::Exhale => config.exhale,
            Phase::Idle | Phase::Complete => 0,
        }
    }

    /// Length of one full inhale-hold-exhale cycle
    pub fn cycle_secs(&self) -> u32 {
        let config = self.config();
        config.inhale + config.hold + config.exhale
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Pattern {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "555" | "5-5-5" => Ok(Self::RelaxedTriad),
            "478" | "4-7-8" => Ok(Self::Sedative),
            other => Err(AppError::validation(format!(
                "Unknown breathing pattern '{}', expected 555 or 478",
                other
            ))),
        }
    }
}

/// Per-phase second counts of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternConfig {
    pub inhale: u32,
    pub hold: u32,
    pub exhale: u32,
}

/// Breathing phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Inhale,
    Hold,
    Exhale,
    Complete,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Inhale => "inhale",
            Self::Hold => "hold",
            Self::Exhale => "exhale",
            Self::Complete => "complete",
        }
    }

    /// Whether this phase is part of the running cycle
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Inhale | Self::Hold | Self::Exhale)
    }

    /// Next phase in the fixed cycle order
    ///
    /// Exhale wraps back to inhale; whether the session instead completes is
    /// decided by the engine. Idle and complete restart at inhale.
    pub fn next_in_cycle(&self) -> Phase {
        match self {
            Self::Inhale => Self::Hold,
            Self::Hold => Self::Exhale,
            Self::Exhale | Self::Idle | Self::Complete => Self::Inhale,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a requested target duration
pub fn validate_target_secs(secs: u32) -> Result<u32, AppError> {
    if !(MIN_TARGET_SECS..=MAX_TARGET_SECS).contains(&secs) {
        return Err(AppError::validation(format!(
            "Duration must be between {} and {} seconds, got {}",
            MIN_TARGET_SECS, MAX_TARGET_SECS, secs
        )));
    }
    Ok(secs)
}

/// Format seconds as `m:ss`
pub fn format_time(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
