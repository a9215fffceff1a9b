//! Screen to tool-set lookup tables

use serde::Serialize;

use super::tools::ToolName;

/// Tools published regardless of the live exercise
pub const HUB_TOOLS: &[ToolName] = &[ToolName::OpenCalm, ToolName::SendGuidance];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroundingScreen {
    #[default]
    Start,
    Step,
    Complete,
    History,
}

impl GroundingScreen {
    pub fn tools(&self) -> &'static [ToolName] {
        match self {
            Self::Start => &[ToolName::StartGroundingSession, ToolName::GetGroundingHistory],
            Self::Step => &[
                ToolName::SubmitGroundingStep,
                ToolName::GetGroundingStatus,
                ToolName::CancelGroundingSession,
            ],
            Self::Complete => &[ToolName::GetGroundingHistory, ToolName::FinishGrounding],
            Self::History => &[
                ToolName::GetGroundingHistory,
                ToolName::DeleteGroundingSession,
                ToolName::CloseGroundingHistory,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathScreen {
    #[default]
    Idle,
    Running,
    Complete,
}

impl BreathScreen {
    pub fn tools(&self) -> &'static [ToolName] {
        match self {
            Self::Idle => &[ToolName::StartBreathingSession, ToolName::GetBreathingHistory],
            Self::Running => &[ToolName::GetBreathingStatus, ToolName::StopBreathingSession],
            Self::Complete => &[
                ToolName::GetBreathingStatus,
                ToolName::GetBreathingHistory,
                ToolName::FinishBreathing,
            ],
        }
    }
}
