//! Shared gateway state

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::bridge::{AgentInteraction, DirectInteraction, ExerciseHub, PublishedTools};

/// Request counters
#[derive(Debug, Default)]
pub struct GatewayStats {
    total_requests: AtomicU64,
    tool_calls: AtomicU64,
}

impl GatewayStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_requests(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_tool_calls(&self) {
        self.tool_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    pub fn tool_calls(&self) -> u64 {
        self.tool_calls.load(Ordering::Relaxed)
    }
}

/// State shared by every handler
///
/// All hub mutations go through the one mutex, so tool calls and ticks are
/// applied one at a time.
#[derive(Clone)]
pub struct GatewayAppState {
    pub hub: Arc<Mutex<ExerciseHub>>,
    /// Tool list as last published by the hub
    pub published: PublishedTools,
    pub ui_dir: Option<PathBuf>,
    pub stats: Arc<GatewayStats>,
    /// Scope interactive tool calls run in
    pub interaction: Arc<dyn AgentInteraction>,
}

impl GatewayAppState {
    pub fn new(hub: Arc<Mutex<ExerciseHub>>, published: PublishedTools, ui_dir: Option<PathBuf>) -> Self {
        Self {
            hub,
            published,
            ui_dir,
            stats: Arc::new(GatewayStats::new()),
            interaction: Arc::new(DirectInteraction),
        }
    }

    pub fn with_interaction(mut self, interaction: Arc<dyn AgentInteraction>) -> Self {
        self.interaction = interaction;
        self
    }
}
