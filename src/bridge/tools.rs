//! Tool descriptors and text results
//!
//! Every tool the bridge can publish is a variant of [`ToolName`]; its wire
//! name, description, input schema and interactive flag are fixed here.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::models::{Exercise, Pattern, DURATION_PRESETS};

/// Every tool the bridge knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    // Hub
    OpenCalm,
    SendGuidance,
    // Breathing
    StartBreathingSession,
    StopBreathingSession,
    GetBreathingStatus,
    GetBreathingHistory,
    FinishBreathing,
    // Grounding
    StartGroundingSession,
    SubmitGroundingStep,
    GetGroundingStatus,
    CancelGroundingSession,
    GetGroundingHistory,
    FinishGrounding,
    DeleteGroundingSession,
    CloseGroundingHistory,
}

impl ToolName {
    pub const ALL: [ToolName; 15] = [
        ToolName::OpenCalm,
        ToolName::SendGuidance,
        ToolName::StartBreathingSession,
        ToolName::StopBreathingSession,
        ToolName::GetBreathingStatus,
        ToolName::GetBreathingHistory,
        ToolName::FinishBreathing,
        ToolName::StartGroundingSession,
        ToolName::SubmitGroundingStep,
        ToolName::GetGroundingStatus,
        ToolName::CancelGroundingSession,
        ToolName::GetGroundingHistory,
        ToolName::FinishGrounding,
        ToolName::DeleteGroundingSession,
        ToolName::CloseGroundingHistory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenCalm => "open_calm",
            Self::SendGuidance => "send_guidance",
            Self::StartBreathingSession => "start-breathing-session",
            Self::StopBreathingSession => "stop-breathing-session",
            Self::GetBreathingStatus => "get-breathing-status",
            Self::GetBreathingHistory => "get-breathing-history",
            Self::FinishBreathing => "finish-breathing",
            Self::StartGroundingSession => "start-grounding-session",
            Self::SubmitGroundingStep => "submit-grounding-step",
            Self::GetGroundingStatus => "get-grounding-status",
            Self::CancelGroundingSession => "cancel-grounding-session",
            Self::GetGroundingHistory => "get-grounding-history",
            Self::FinishGrounding => "finish-grounding",
            Self::DeleteGroundingSession => "delete-grounding-session",
            Self::CloseGroundingHistory => "close-grounding-history",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|tool| tool.as_str() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::OpenCalm => "Open a calming exercise UI. Choose 'breath' for breathing exercises (5-5-5 or 4-7-8 patterns) or 'grounding' for the 5-4-3-2-1 grounding technique.",
            Self::SendGuidance => "Send a guidance or encouragement message to display in the Calm Tools UI.",
            Self::StartBreathingSession => "Start a guided breathing session. Pattern '555' is balanced (inhale 5, hold 5, exhale 5); '478' is calming (inhale 4, hold 7, exhale 8).",
            Self::StopBreathingSession => "Stop the running breathing session. The session is recorded as not completed.",
            Self::GetBreathingStatus => "Get the current breathing phase, countdown, elapsed time and completed cycles.",
            Self::GetBreathingHistory => "Get the most recent breathing sessions with completion statistics.",
            Self::FinishBreathing => "Close the completion screen and return to pattern selection.",
            Self::StartGroundingSession => "Start a 5-4-3-2-1 grounding session at the first step (5 things you can see).",
            Self::SubmitGroundingStep => "Submit the responses for the current grounding step. Provide exactly as many entries as the step requires; at least one must be non-empty.",
            Self::GetGroundingStatus => "Get the current grounding step, its category and how many responses it requires.",
            Self::CancelGroundingSession => "Cancel the grounding session in progress. Responses are discarded. Requires confirmed: true.",
            Self::GetGroundingHistory => "Get past grounding sessions, newest first.",
            Self::FinishGrounding => "Close the completion screen and return to the start screen.",
            Self::DeleteGroundingSession => "Delete a saved grounding session by id. Requires confirmed: true.",
            Self::CloseGroundingHistory => "Close the history screen and return to the start screen.",
        }
    }

    pub fn input_schema(&self) -> Value {
        match self {
            Self::OpenCalm => json!({
                "type": "object",
                "properties": {
                    "exercise": {
                        "type": "string",
                        "enum": ["breath", "grounding"],
                        "description": "Which exercise to open"
                    },
                    "config": {
                        "type": "object",
                        "description": "Exercise configuration",
                        "properties": {
                            "pattern": { "type": "string", "enum": pattern_names(), "description": "Breathing pattern" },
                            "duration": { "type": "integer", "description": "Duration in seconds" },
                            "locale": { "type": "string", "enum": ["en", "ja"], "description": "UI language" }
                        }
                    }
                },
                "required": ["exercise"]
            }),
            Self::SendGuidance => json!({
                "type": "object",
                "properties": {
                    "message": { "type": "string", "description": "Message to display in the UI" },
                    "type": {
                        "type": "string",
                        "enum": ["guidance", "encouragement"],
                        "default": "guidance",
                        "description": "Message type"
                    }
                },
                "required": ["message"]
            }),
            Self::StartBreathingSession => json!({
                "type": "object",
                "properties": {
                    "pattern": { "type": "string", "enum": pattern_names(), "description": "Breathing pattern" },
                    "duration": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": 3600,
                        "examples": DURATION_PRESETS,
                        "description": "Target duration in seconds"
                    }
                }
            }),
            Self::SubmitGroundingStep => json!({
                "type": "object",
                "properties": {
                    "responses": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "One entry per required item; empty strings are allowed"
                    }
                },
                "required": ["responses"]
            }),
            Self::CancelGroundingSession => json!({
                "type": "object",
                "properties": {
                    "confirmed": { "type": "boolean", "description": "Must be true to cancel" }
                },
                "required": ["confirmed"]
            }),
            Self::DeleteGroundingSession => json!({
                "type": "object",
                "properties": {
                    "id": { "type": "integer", "description": "Session id from get-grounding-history" },
                    "confirmed": { "type": "boolean", "description": "Must be true to delete" }
                },
                "required": ["id", "confirmed"]
            }),
            Self::StopBreathingSession
            | Self::GetBreathingStatus
            | Self::GetBreathingHistory
            | Self::FinishBreathing
            | Self::StartGroundingSession
            | Self::GetGroundingStatus
            | Self::GetGroundingHistory
            | Self::FinishGrounding
            | Self::CloseGroundingHistory => json!({ "type": "object", "properties": {} }),
        }
    }

    /// Exercise whose controller handles this tool; `None` for hub tools
    pub fn exercise(&self) -> Option<Exercise> {
        match self {
            Self::OpenCalm | Self::SendGuidance => None,
            Self::StartBreathingSession
            | Self::StopBreathingSession
            | Self::GetBreathingStatus
            | Self::GetBreathingHistory
            | Self::FinishBreathing => Some(Exercise::Breath),
            Self::StartGroundingSession
            | Self::SubmitGroundingStep
            | Self::GetGroundingStatus
            | Self::CancelGroundingSession
            | Self::GetGroundingHistory
            | Self::FinishGrounding
            | Self::DeleteGroundingSession
            | Self::CloseGroundingHistory => Some(Exercise::Grounding),
        }
    }

    /// Whether a call must run inside the user-interaction scope
    ///
    /// Everything that mutates state is interactive; status and history
    /// reads are not. A history read that also changes the screen is run
    /// interactively by the hub.
    pub fn interactive(&self) -> bool {
        !matches!(
            self,
            Self::GetBreathingStatus
                | Self::GetBreathingHistory
                | Self::GetGroundingStatus
                | Self::GetGroundingHistory
        )
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.as_str().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
            interactive: self.interactive(),
        }
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn pattern_names() -> Vec<&'static str> {
    Pattern::ALL.iter().map(Pattern::as_str).collect()
}

/// Decode a tool's arguments, treating missing arguments as `{}`
pub fn parse_args<T: DeserializeOwned>(tool: ToolName, args: Value) -> Result<T, AppError> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args)
        .map_err(|e| AppError::validation(format!("Invalid arguments for {}: {}", tool, e)))
}

/// Tool as listed to the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    #[serde(skip)]
    pub interactive: bool,
}

/// Single content block of a tool result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text { text: String },
}

/// `{content: [{type: "text", text}]}` result returned by every tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: true,
        }
    }

    /// Text of the first content block
    pub fn first_text(&self) -> &str {
        match self.content.first() {
            Some(ToolContent::Text { text }) => text,
            None => "",
        }
    }
}
