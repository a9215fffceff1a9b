//! Publishing the tool list and the interactive call scope

use std::sync::{Arc, RwLock};

use serde::Serialize;

use super::tools::{ToolDescriptor, ToolName, ToolResult};

/// Complete set of tools currently callable
///
/// Always published whole; a new context replaces the previous one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolContext {
    pub tools: Vec<ToolDescriptor>,
}

impl ToolContext {
    pub fn from_names(names: &[ToolName]) -> Self {
        Self {
            tools: names.iter().map(ToolName::descriptor).collect(),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }
}

/// Receiver of tool-list updates
pub trait ModelContext: Send + Sync {
    fn provide_context(&self, context: ToolContext);
}

/// Host hook marking a call as a user-facing interaction
///
/// The callback's logic is the same either way; the host decides what
/// "interactive" means (focus the UI, show progress, ask for consent).
pub trait AgentInteraction: Send + Sync {
    fn request_user_interaction(
        &self,
        tool: ToolName,
        run: &mut dyn FnMut() -> ToolResult,
    ) -> ToolResult;
}

/// Runs the callback directly
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectInteraction;

impl AgentInteraction for DirectInteraction {
    fn request_user_interaction(
        &self,
        tool: ToolName,
        run: &mut dyn FnMut() -> ToolResult,
    ) -> ToolResult {
        tracing::debug!(tool = %tool, "Interactive tool call");
        run()
    }
}

#[derive(Debug, Default)]
struct Published {
    version: u64,
    context: Option<ToolContext>,
}

/// Latest published context, shared with readers such as `tools/list`
#[derive(Debug, Clone, Default)]
pub struct PublishedTools {
    inner: Arc<RwLock<Published>>,
}

impl PublishedTools {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times a context has been published
    pub fn version(&self) -> u64 {
        self.read(|p| p.version)
    }

    pub fn snapshot(&self) -> Option<ToolContext> {
        self.read(|p| p.context.clone())
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.read(|p| p.context.as_ref().map(|c| c.tools.clone()).unwrap_or_default())
    }

    pub fn names(&self) -> Vec<String> {
        self.read(|p| {
            p.context
                .as_ref()
                .map(|c| c.tools.iter().map(|t| t.name.clone()).collect())
                .unwrap_or_default()
        })
    }

    fn read<T>(&self, f: impl FnOnce(&Published) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }
}

impl ModelContext for PublishedTools {
    fn provide_context(&self, context: ToolContext) {
        let mut guard = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.version += 1;
        tracing::debug!(
            version = guard.version,
            tools = ?context.names(),
            "Published tool context"
        );
        guard.context = Some(context);
    }
}
