//! Domain models for Calm Tools
//!
//! Plain data shared by the exercise engines, the tool bridge and storage.

pub mod breath;
pub mod grounding;
pub mod locale;
pub mod record;

pub use breath::{format_time, validate_target_secs, Pattern, PatternConfig, Phase, DURATION_PRESETS};
pub use grounding::{GroundingResult, GroundingStepResponse, SenseCategory, StepConfig, STEPS};
pub use locale::Locale;
pub use record::{
    BreathResult, BreathSessionRecord, BreathStats, Exercise, GroundingSessionRecord,
    SessionResult,
};
