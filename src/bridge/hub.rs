//! Exercise hub
//!
//! Owns both controllers and decides which exercise is live. Every mutation,
//! whether it comes from the UI, an agent tool call or the breathing tick,
//! ends in [`ExerciseHub::sync_tools`], which republishes the tool list when
//! the live screen's tool set changed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::breath::BreathController;
use super::context::{AgentInteraction, ModelContext, ToolContext};
use super::events::EventSink;
use super::grounding::GroundingController;
use super::screens::HUB_TOOLS;
use super::tools::{parse_args, ToolName, ToolResult};
use crate::error::AppError;
use crate::exercise::{Clock, TickScheduler};
use crate::models::{
    validate_target_secs, BreathSessionRecord, Exercise, GroundingSessionRecord, Locale, Pattern,
};
use crate::storage::SessionStore;

/// How long a guidance message stays visible
pub const GUIDANCE_TTL: Duration = Duration::from_secs(5);

/// Collaborators the hub is wired with
pub struct HubServices {
    pub clock: Arc<dyn Clock>,
    pub scheduler: Arc<dyn TickScheduler>,
    pub context: Arc<dyn ModelContext>,
    pub events: Arc<dyn EventSink>,
    pub breath_store: Arc<dyn SessionStore<BreathSessionRecord>>,
    pub grounding_store: Arc<dyn SessionStore<GroundingSessionRecord>>,
    pub locale: Locale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuidanceKind {
    #[default]
    Guidance,
    Encouragement,
}

impl GuidanceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guidance => "guidance",
            Self::Encouragement => "encouragement",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guidance {
    pub message: String,
    pub kind: GuidanceKind,
    sent_at: Instant,
}

/// Optional configuration passed to `open_calm`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<Locale>,
}

impl OpenConfig {
    fn is_empty(&self) -> bool {
        self.pattern.is_none() && self.duration.is_none() && self.locale.is_none()
    }
}

#[derive(Debug, Deserialize)]
struct OpenArgs {
    exercise: Exercise,
    #[serde(default)]
    config: Option<OpenConfig>,
}

#[derive(Debug, Deserialize)]
struct GuidanceArgs {
    message: String,
    #[serde(default, rename = "type")]
    kind: GuidanceKind,
}

pub struct ExerciseHub {
    live: Option<Exercise>,
    breath: BreathController,
    grounding: GroundingController,
    guidance: Option<Guidance>,
    context: Arc<dyn ModelContext>,
    clock: Arc<dyn Clock>,
    published: Option<Vec<ToolName>>,
}

impl ExerciseHub {
    /// Build the hub and publish the initial tool list
    pub fn new(services: HubServices) -> Self {
        let HubServices {
            clock,
            scheduler,
            context,
            events,
            breath_store,
            grounding_store,
            locale,
        } = services;

        let breath = BreathController::new(clock.clone(), scheduler, breath_store, events.clone());
        let grounding = GroundingController::new(locale, grounding_store, events, clock.clone());

        let mut hub = Self {
            live: None,
            breath,
            grounding,
            guidance: None,
            context,
            clock,
            published: None,
        };
        hub.sync_tools();
        hub
    }

    pub fn live_exercise(&self) -> Option<Exercise> {
        self.live
    }

    pub fn breath(&self) -> &BreathController {
        &self.breath
    }

    pub fn grounding(&self) -> &GroundingController {
        &self.grounding
    }

    /// Mutate the breathing controller as the UI would, then republish
    pub fn with_breath<T>(&mut self, f: impl FnOnce(&mut BreathController) -> T) -> T {
        let out = f(&mut self.breath);
        self.sync_tools();
        out
    }

    /// Mutate the grounding controller as the UI would, then republish
    pub fn with_grounding<T>(&mut self, f: impl FnOnce(&mut GroundingController) -> T) -> T {
        let out = f(&mut self.grounding);
        self.sync_tools();
        out
    }

    /// Breathing tick entry point; returns whether ticking should continue
    pub fn tick(&mut self) -> bool {
        let running = self.breath.tick();
        self.sync_tools();
        running
    }

    /// Make `exercise` the live one and apply `config`
    ///
    /// Leaving a running breathing session stops it; a grounding session in
    /// progress is kept and resumes when grounding is opened again.
    ///
    /// Nothing changes unless the whole configuration is accepted.
    pub fn open(&mut self, exercise: Exercise, config: &OpenConfig) -> Result<(), AppError> {
        let leaves_breath = self.live == Some(Exercise::Breath) && exercise != Exercise::Breath;

        if let Some(locale) = config.locale {
            self.grounding.check_locale(locale)?;
        }
        if !leaves_breath {
            if config.pattern.is_some() {
                self.breath.ensure_not_running("pattern")?;
            }
            if config.duration.is_some() {
                self.breath.ensure_not_running("duration")?;
            }
        }
        if let Some(duration) = config.duration {
            validate_target_secs(duration)?;
        }

        if leaves_breath {
            self.breath.stop("switched_exercise");
        }
        if let Some(locale) = config.locale {
            self.grounding.set_locale(locale)?;
        }
        if let Some(pattern) = config.pattern {
            self.breath.select_pattern(pattern)?;
        }
        if let Some(duration) = config.duration {
            self.breath.select_duration(duration)?;
        }

        if self.live != Some(exercise) {
            tracing::info!(%exercise, "Opened exercise");
        }
        self.live = Some(exercise);
        self.sync_tools();
        Ok(())
    }

    pub fn send_guidance(&mut self, message: &str, kind: GuidanceKind) -> Result<(), AppError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::validation("Guidance message must not be empty"));
        }
        tracing::info!(kind = kind.as_str(), %message, "Guidance sent");
        self.guidance = Some(Guidance {
            message: message.to_string(),
            kind,
            sent_at: self.clock.now(),
        });
        Ok(())
    }

    /// Guidance sent within the last five seconds
    pub fn current_guidance(&self) -> Option<&Guidance> {
        let guidance = self.guidance.as_ref()?;
        let age = self.clock.now().saturating_duration_since(guidance.sent_at);
        (age < GUIDANCE_TTL).then_some(guidance)
    }

    /// Hub tools plus the live screen's tools
    pub fn tools(&self) -> Vec<ToolName> {
        let screen_tools: &[ToolName] = match self.live {
            Some(Exercise::Breath) => self.breath.tools(),
            Some(Exercise::Grounding) => self.grounding.tools(),
            None => &[],
        };
        HUB_TOOLS.iter().chain(screen_tools).copied().collect()
    }

    /// Invoke a tool by wire name
    ///
    /// Never fails: unknown tools, tools not legal on the current screen and
    /// handler errors all come back as error text results.
    pub fn call_tool(
        &mut self,
        name: &str,
        args: Value,
        interaction: &dyn AgentInteraction,
    ) -> ToolResult {
        let available = self.tools();
        let Some(tool) = ToolName::from_name(name).filter(|tool| available.contains(tool)) else {
            let names: Vec<&str> = available.iter().map(ToolName::as_str).collect();
            tracing::debug!(tool = name, "Rejected unavailable tool");
            return ToolResult::error(format!(
                "Tool \"{}\" is not available. Available tools: {}",
                name,
                names.join(", ")
            ));
        };

        let navigates = self.grounding.navigates(tool);
        let result = if tool.interactive() || navigates {
            let mut args = Some(args);
            interaction.request_user_interaction(tool, &mut || {
                let args = args.take().unwrap_or(Value::Null);
                self.run_tool(tool, args)
            })
        } else {
            self.run_tool(tool, args)
        };

        self.sync_tools();
        result
    }

    fn run_tool(&mut self, tool: ToolName, args: Value) -> ToolResult {
        let outcome = match tool.exercise() {
            Some(Exercise::Breath) => self.breath.handle_tool(tool, args),
            Some(Exercise::Grounding) => self.grounding.handle_tool(tool, args),
            None => self.handle_hub_tool(tool, args),
        };

        match outcome {
            Ok(text) => ToolResult::text(text),
            Err(err) => {
                tracing::debug!(tool = %tool, code = err.code(), error = %err, "Tool call failed");
                ToolResult::error(err.to_string())
            }
        }
    }

    fn handle_hub_tool(&mut self, tool: ToolName, args: Value) -> Result<String, AppError> {
        match tool {
            ToolName::OpenCalm => {
                let args: OpenArgs = parse_args(tool, args)?;
                let config = args.config.unwrap_or_default();
                self.open(args.exercise, &config)?;
                if config.is_empty() {
                    Ok(format!("Opening {} exercise...", args.exercise))
                } else {
                    Ok(format!(
                        "Opening {} exercise with config: {}...",
                        args.exercise,
                        serde_json::to_string(&config)?
                    ))
                }
            }
            ToolName::SendGuidance => {
                let args: GuidanceArgs = parse_args(tool, args)?;
                self.send_guidance(&args.message, args.kind)?;
                Ok(format!(
                    "Sent {} message to UI: \"{}\"",
                    args.kind.as_str(),
                    args.message.trim()
                ))
            }
            other => Err(AppError::internal(format!("{} is not a hub tool", other))),
        }
    }

    /// Republish the tool list if the live tool set changed
    pub fn sync_tools(&mut self) {
        let tools = self.tools();
        if self.published.as_ref() == Some(&tools) {
            return;
        }
        self.context.provide_context(ToolContext::from_names(&tools));
        self.published = Some(tools);
    }
}

impl Drop for ExerciseHub {
    fn drop(&mut self) {
        // Release the tick guard before the controllers go away
        self.breath.reset();
    }
}
