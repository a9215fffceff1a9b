//! Grounding session controller
//!
//! Single owner of the grounding session. UI handlers and agent tools both go
//! through these methods; the current [`GroundingScreen`] decides which tools
//! are published.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::Value;

use super::events::{CalmEvent, EventSink};
use super::screens::GroundingScreen;
use super::tools::{parse_args, ToolName};
use crate::error::AppError;
use crate::exercise::{Clock, GroundingSequencer, GroundingStatus, StepOutcome, StepStatus};
use crate::models::{Exercise, GroundingResult, GroundingSessionRecord, Locale, SessionResult};
use crate::storage::SessionStore;

/// How long a validation message stays visible
pub const VALIDATION_MESSAGE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Deserialize)]
struct SubmitArgs {
    responses: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CancelArgs {
    #[serde(default)]
    confirmed: bool,
}

#[derive(Debug, Deserialize)]
struct DeleteArgs {
    id: i64,
    #[serde(default)]
    confirmed: bool,
}

pub struct GroundingController {
    sequencer: GroundingSequencer,
    screen: GroundingScreen,
    store: Arc<dyn SessionStore<GroundingSessionRecord>>,
    events: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    validation: Option<(String, Instant)>,
    last_result: Option<GroundingResult>,
}

impl GroundingController {
    pub fn new(
        locale: Locale,
        store: Arc<dyn SessionStore<GroundingSessionRecord>>,
        events: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sequencer: GroundingSequencer::new(locale),
            screen: GroundingScreen::Start,
            store,
            events,
            clock,
            validation: None,
            last_result: None,
        }
    }

    pub fn screen(&self) -> GroundingScreen {
        self.screen
    }

    pub fn tools(&self) -> &'static [ToolName] {
        self.screen.tools()
    }

    pub fn locale(&self) -> Locale {
        self.sequencer.locale()
    }

    /// Change the language of step titles; refused mid-session
    pub fn set_locale(&mut self, locale: Locale) -> Result<(), AppError> {
        self.check_locale(locale)?;
        self.sequencer.set_locale(locale);
        Ok(())
    }

    pub fn check_locale(&self, locale: Locale) -> Result<(), AppError> {
        if self.sequencer.is_in_progress() && locale != self.sequencer.locale() {
            return Err(AppError::validation(
                "Cannot change language while a grounding session is in progress",
            ));
        }
        Ok(())
    }

    pub fn start_session(&mut self) -> StepStatus {
        self.validation = None;
        self.last_result = None;
        let status = self.sequencer.start_session();
        self.screen = GroundingScreen::Step;
        self.events.emit(CalmEvent::SessionStart {
            exercise: Exercise::Grounding,
        });
        status
    }

    /// Submit the current step's entries
    ///
    /// Validation failures leave the step unchanged and raise the transient
    /// validation message. Finishing the last step persists the session; a
    /// storage failure is logged and the screen still moves to complete.
    pub fn submit_step(&mut self, entries: &[String]) -> Result<StepOutcome, AppError> {
        if self.screen != GroundingScreen::Step {
            return Err(AppError::validation("No grounding session in progress"));
        }

        let outcome = match self.sequencer.submit_step(entries) {
            Ok(outcome) => outcome,
            Err(err) => {
                if err.is_validation() {
                    self.validation = Some((err.to_string(), self.clock.now()));
                }
                return Err(err);
            }
        };
        self.validation = None;

        if let StepOutcome::Finished(result) = &outcome {
            match self.store.save(&GroundingSessionRecord::from(result)) {
                Ok(id) => tracing::info!(id, "Saved grounding session"),
                Err(e) => tracing::warn!(error = %e, "Failed to save grounding session"),
            }
            self.events.emit(CalmEvent::SessionComplete {
                result: SessionResult::Grounding(result.clone()),
            });
            self.last_result = Some(result.clone());
            self.screen = GroundingScreen::Complete;
        }

        Ok(outcome)
    }

    /// Discard the session in progress once confirmed
    ///
    /// Returns whether anything was cancelled.
    pub fn cancel_session(&mut self, confirmed: bool) -> bool {
        if !self.sequencer.cancel(confirmed) {
            return false;
        }
        self.validation = None;
        self.screen = GroundingScreen::Start;
        self.events.emit(CalmEvent::SessionAbort {
            reason: "user_cancelled".to_string(),
        });
        true
    }

    /// Leave the completion screen
    pub fn finish(&mut self) {
        self.sequencer.reset();
        self.last_result = None;
        self.screen = GroundingScreen::Start;
    }

    pub fn show_history(&mut self) -> Result<(), AppError> {
        if self.sequencer.is_in_progress() {
            return Err(AppError::validation(
                "Finish or cancel the current grounding session first",
            ));
        }
        self.screen = GroundingScreen::History;
        Ok(())
    }

    /// Whether running `tool` now would change the screen
    ///
    /// A history read from the start screen opens the history screen.
    pub fn navigates(&self, tool: ToolName) -> bool {
        tool == ToolName::GetGroundingHistory && self.screen == GroundingScreen::Start
    }

    pub fn close_history(&mut self) {
        if self.screen == GroundingScreen::History {
            self.screen = GroundingScreen::Start;
        }
    }

    pub fn history(&self) -> Result<Vec<GroundingSessionRecord>, AppError> {
        Ok(self.store.list()?)
    }

    /// Delete a saved session once confirmed
    pub fn delete_session(&mut self, id: i64, confirmed: bool) -> Result<bool, AppError> {
        if !confirmed {
            return Ok(false);
        }
        self.store.delete(id)?;
        tracing::info!(id, "Deleted grounding session");
        Ok(true)
    }

    pub fn status(&self) -> GroundingStatus {
        self.sequencer.status()
    }

    pub fn last_result(&self) -> Option<&GroundingResult> {
        self.last_result.as_ref()
    }

    /// Validation message, if raised less than three seconds ago
    pub fn validation_message(&self) -> Option<&str> {
        let (message, raised_at) = self.validation.as_ref()?;
        let age = self.clock.now().saturating_duration_since(*raised_at);
        (age < VALIDATION_MESSAGE_TTL).then_some(message.as_str())
    }

    /// Run one grounding tool
    pub fn handle_tool(&mut self, tool: ToolName, args: Value) -> Result<String, AppError> {
        let locale = self.locale();
        match tool {
            ToolName::StartGroundingSession => {
                let status = self.start_session();
                Ok(format!(
                    "Grounding session started. {} Provide {} responses.",
                    describe_step(&status),
                    status.required_count
                ))
            }
            ToolName::SubmitGroundingStep => {
                let args: SubmitArgs = parse_args(tool, args)?;
                let submitted = self.status().current_step.unwrap_or_default() + 1;
                match self.submit_step(&args.responses)? {
                    StepOutcome::Advanced(next) => Ok(format!(
                        "Step {} recorded. Next: {} Provide {} responses.",
                        submitted,
                        describe_step(&next),
                        next.required_count
                    )),
                    StepOutcome::Finished(result) => Ok(format!(
                        "All {} steps completed. {}",
                        result.responses.len(),
                        SessionResult::Grounding(result).summary()
                    )),
                }
            }
            ToolName::GetGroundingStatus => Ok(to_json(&self.status())?),
            ToolName::CancelGroundingSession => {
                let args: CancelArgs = parse_args(tool, args)?;
                if !args.confirmed {
                    return Ok(format!(
                        "{} Call cancel-grounding-session again with confirmed: true to discard the responses.",
                        locale.confirm_cancel_message()
                    ));
                }
                if self.cancel_session(true) {
                    Ok("Grounding session cancelled. Responses were discarded.".to_string())
                } else {
                    Err(AppError::validation("No grounding session in progress"))
                }
            }
            ToolName::GetGroundingHistory => {
                let records = self.history()?;
                if self.navigates(tool) {
                    self.show_history()?;
                }
                if records.is_empty() {
                    return Ok("No grounding sessions recorded yet.".to_string());
                }
                Ok(to_json(&records)?)
            }
            ToolName::FinishGrounding => {
                self.finish();
                Ok("Grounding exercise finished. Returned to the start screen.".to_string())
            }
            ToolName::DeleteGroundingSession => {
                let args: DeleteArgs = parse_args(tool, args)?;
                if self.delete_session(args.id, args.confirmed)? {
                    Ok(format!("Deleted grounding session {}.", args.id))
                } else {
                    Ok(format!(
                        "{} Call delete-grounding-session again with confirmed: true to delete session {}.",
                        locale.confirm_delete_message(),
                        args.id
                    ))
                }
            }
            ToolName::CloseGroundingHistory => {
                self.close_history();
                Ok("Closed history. Returned to the start screen.".to_string())
            }
            other => Err(AppError::internal(format!(
                "{} is not a grounding tool",
                other
            ))),
        }
    }
}

fn describe_step(status: &StepStatus) -> String {
    format!(
        "Step {} of {}: {}.",
        status.step + 1,
        status.total_steps,
        status.title
    )
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(value)?)
}

