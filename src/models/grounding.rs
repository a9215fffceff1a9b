//! 5-4-3-2-1 grounding domain types

use serde::{Deserialize, Serialize};

use super::locale::Locale;

/// Sense category of a grounding step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenseCategory {
    Sight,
    Touch,
    Sound,
    Smell,
    Taste,
}

impl SenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sight => "sight",
            Self::Touch => "touch",
            Self::Sound => "sound",
            Self::Smell => "smell",
            Self::Taste => "taste",
        }
    }
}

impl std::fmt::Display for SenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fixed step of the exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepConfig {
    pub category: SenseCategory,
    pub required_count: usize,
}

/// The five steps, in their only order
pub const STEPS: [StepConfig; 5] = [
    StepConfig { category: SenseCategory::Sight, required_count: 5 },
    StepConfig { category: SenseCategory::Touch, required_count: 4 },
    StepConfig { category: SenseCategory::Sound, required_count: 3 },
    StepConfig { category: SenseCategory::Smell, required_count: 2 },
    StepConfig { category: SenseCategory::Taste, required_count: 1 },
];

pub fn total_steps() -> usize {
    STEPS.len()
}

pub fn is_last_step(index: usize) -> bool {
    index + 1 >= STEPS.len()
}

/// Progress through the exercise as a percentage (0-100)
pub fn progress_percent(index: usize) -> f64 {
    (index as f64 / STEPS.len() as f64) * 100.0
}

/// Responses collected for one step
///
/// `data` keeps one entry per required item, trimmed, blanks included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingStepResponse {
    pub step: usize,
    pub category: SenseCategory,
    pub title: String,
    pub data: Vec<String>,
}

impl GroundingStepResponse {
    /// Entries that were actually filled in
    pub fn filled(&self) -> impl Iterator<Item = &str> {
        self.data.iter().map(String::as_str).filter(|s| !s.is_empty())
    }
}

/// Immutable outcome of a finished grounding session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingResult {
    pub locale: Locale,
    /// One entry per category, in step order
    pub responses: Vec<GroundingStepResponse>,
}

impl GroundingResult {
    pub fn for_category(&self, category: SenseCategory) -> Option<&GroundingStepResponse> {
        self.responses.iter().find(|r| r.category == category)
    }

    /// Count of filled entries per category, in step order
    pub fn filled_counts(&self) -> Vec<(SenseCategory, usize)> {
        self.responses
            .iter()
            .map(|r| (r.category, r.filled().count()))
            .collect()
    }
}
