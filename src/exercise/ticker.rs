//! Scoped periodic tick resource
//!
//! A [`TickHandle`] owns whatever drives the breathing tick. Dropping or
//! cancelling it releases the timer, so every exit path (stop, completion,
//! teardown) clears the outstanding tick before state is reset.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Starts a periodic tick and hands back the guard that stops it
pub trait TickScheduler: Send + Sync {
    fn schedule(&self, period: Duration) -> TickHandle;
}

/// Guard for a running periodic tick
pub struct TickHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TickHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stop the tick now
    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for TickHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickHandle")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Scheduler that never fires on its own
///
/// The caller drives ticks by hand; the scheduler only counts how many
/// handles are still outstanding.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    active: Arc<AtomicUsize>,
    scheduled: Arc<AtomicUsize>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles not yet released
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Handles ever handed out
    pub fn scheduled(&self) -> usize {
        self.scheduled.load(Ordering::SeqCst)
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule(&self, _period: Duration) -> TickHandle {
        self.scheduled.fetch_add(1, Ordering::SeqCst);
        self.active.fetch_add(1, Ordering::SeqCst);
        let active = self.active.clone();
        TickHandle::new(move || {
            active.fetch_sub(1, Ordering::SeqCst);
        })
    }
}
