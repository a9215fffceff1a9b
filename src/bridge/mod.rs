//! Agent tool bridge
//!
//! Exposes the live exercise's legal operations as a tool list and routes
//! tool calls into the same controller methods the UI uses.

pub mod breath;
pub mod context;
pub mod events;
pub mod grounding;
pub mod hub;
pub mod screens;
pub mod tools;

pub use breath::{BreathController, BreathHistory};
pub use context::{
    AgentInteraction, DirectInteraction, ModelContext, PublishedTools, ToolContext,
};
pub use events::{CalmEvent, EventSink, LogEventSink};
pub use grounding::GroundingController;
pub use hub::{ExerciseHub, Guidance, GuidanceKind, HubServices, OpenConfig};
pub use screens::{BreathScreen, GroundingScreen, HUB_TOOLS};
pub use tools::{ToolContent, ToolDescriptor, ToolName, ToolResult};

#[cfg(test)]
mod tests;
