//! 5-4-3-2-1 grounding step sequencer
//!
//! Walks sight, touch, sound, smell and taste in order. A step advances only
//! when at least one of its entries is non-blank; blank entries are kept so
//! each stored step has exactly `required_count` values.

use serde::Serialize;

use crate::error::AppError;
use crate::models::grounding::{self, StepConfig, STEPS};
use crate::models::{GroundingResult, GroundingStepResponse, Locale, SenseCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequencerState {
    NotStarted,
    InStep(usize),
    Finished,
}

/// The step currently waiting for input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStatus {
    pub step: usize,
    pub category: SenseCategory,
    pub title: String,
    pub instruction: String,
    pub required_count: usize,
    pub total_steps: usize,
}

/// Result of a successful submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced(StepStatus),
    Finished(GroundingResult),
}

/// Read-only view of the whole session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingStatus {
    pub in_progress: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<SenseCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_count: Option<usize>,
    pub completed_steps: usize,
    pub total_steps: usize,
    pub progress_percent: f64,
}

#[derive(Debug, Clone)]
pub struct GroundingSequencer {
    locale: Locale,
    state: SequencerState,
    responses: Vec<GroundingStepResponse>,
}

impl GroundingSequencer {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            state: SequencerState::NotStarted,
            responses: Vec::with_capacity(STEPS.len()),
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    /// Begin at step 0 with an empty response map
    ///
    /// Restarting discards any session in progress.
    pub fn start_session(&mut self) -> StepStatus {
        self.responses.clear();
        self.state = SequencerState::InStep(0);
        self.step_status(0)
    }

    /// Submit the entries for the current step
    ///
    /// `entries` must hold exactly `required_count` values. Values are stored
    /// trimmed. A submission whose entries are all blank is rejected and the
    /// step index is left unchanged.
    pub fn submit_step(&mut self, entries: &[String]) -> Result<StepOutcome, AppError> {
        let SequencerState::InStep(index) = self.state else {
            return Err(AppError::validation("No grounding session in progress"));
        };
        let config = STEPS[index];

        if entries.len() != config.required_count {
            return Err(AppError::validation(format!(
                "Step {} ({}) expects {} responses, got {}",
                index + 1,
                config.category,
                config.required_count,
                entries.len()
            )));
        }

        let data: Vec<String> = entries.iter().map(|e| e.trim().to_string()).collect();
        if data.iter().all(String::is_empty) {
            return Err(AppError::validation(self.locale.empty_step_message()));
        }

        self.responses.push(GroundingStepResponse {
            step: index,
            category: config.category,
            title: self.locale.step_title(config.category).to_string(),
            data,
        });

        if grounding::is_last_step(index) {
            self.state = SequencerState::Finished;
            return Ok(StepOutcome::Finished(GroundingResult {
                locale: self.locale,
                responses: self.responses.clone(),
            }));
        }

        let next = index + 1;
        self.state = SequencerState::InStep(next);
        Ok(StepOutcome::Advanced(self.step_status(next)))
    }

    /// Abandon the session in progress
    ///
    /// Without confirmation nothing happens. Returns whether a session was
    /// actually cancelled.
    pub fn cancel(&mut self, confirmed: bool) -> bool {
        if !confirmed || !self.is_in_progress() {
            return false;
        }
        self.reset();
        true
    }

    pub fn reset(&mut self) {
        self.state = SequencerState::NotStarted;
        self.responses.clear();
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self.state, SequencerState::InStep(_))
    }

    pub fn is_finished(&self) -> bool {
        self.state == SequencerState::Finished
    }

    pub fn current_step(&self) -> Option<usize> {
        match self.state {
            SequencerState::InStep(index) => Some(index),
            _ => None,
        }
    }

    /// Responses collected so far, in step order
    pub fn responses(&self) -> &[GroundingStepResponse] {
        &self.responses
    }

    pub fn current(&self) -> Option<StepStatus> {
        self.current_step().map(|index| self.step_status(index))
    }

    pub fn status(&self) -> GroundingStatus {
        let current = self.current_step();
        let config: Option<StepConfig> = current.map(|index| STEPS[index]);
        let completed_steps = self.responses.len();

        GroundingStatus {
            in_progress: current.is_some(),
            current_step: current,
            category: config.map(|c| c.category),
            title: config.map(|c| self.locale.step_title(c.category).to_string()),
            required_count: config.map(|c| c.required_count),
            completed_steps,
            total_steps: grounding::total_steps(),
            progress_percent: grounding::progress_percent(completed_steps),
        }
    }

    fn step_status(&self, index: usize) -> StepStatus {
        let config = STEPS[index];
        StepStatus {
            step: index,
            category: config.category,
            title: self.locale.step_title(config.category).to_string(),
            instruction: self.locale.step_instruction(config.category).to_string(),
            required_count: config.required_count,
            total_steps: grounding::total_steps(),
        }
    }
}

impl Default for GroundingSequencer {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}
