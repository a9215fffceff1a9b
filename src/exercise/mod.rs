//! Exercise engines
//!
//! Pure state machines for the breathing and grounding exercises. Neither
//! engine touches storage or the agent bridge; time comes from a [`Clock`]
//! and ticks from a [`TickScheduler`].

pub mod breath;
pub mod clock;
pub mod grounding;
pub mod ticker;

pub use breath::{BreathEngine, BreathEvent, BreathStatus};
pub use clock::{Clock, ManualClock, SystemClock};
pub use grounding::{GroundingSequencer, GroundingStatus, StepOutcome, StepStatus};
pub use ticker::{ManualScheduler, TickHandle, TickScheduler};
