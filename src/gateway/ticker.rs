//! tokio-driven breathing tick
//!
//! Each scheduled tick is an interval task that calls [`ExerciseHub::tick`]
//! on the blocking pool, like tool calls do. The returned [`TickHandle`] aborts the task, and the
//! task holds only a weak reference so it never keeps the hub alive.

use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::bridge::ExerciseHub;
use crate::exercise::{TickHandle, TickScheduler};

pub struct HubTicker {
    runtime: Handle,
    hub: Weak<Mutex<ExerciseHub>>,
}

impl HubTicker {
    pub fn new(runtime: Handle, hub: Weak<Mutex<ExerciseHub>>) -> Self {
        Self { runtime, hub }
    }
}

impl TickScheduler for HubTicker {
    fn schedule(&self, period: Duration) -> TickHandle {
        let hub = self.hub.clone();
        let task = self.runtime.spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            // Elapsed comes from the start instant, so late ticks need no catch-up burst
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(hub) = hub.upgrade() else {
                    break;
                };
                // Completion persists to SQLite, so the tick runs off the async workers
                let tick = tokio::task::spawn_blocking(move || hub.blocking_lock().tick());
                let running = match tick.await {
                    Ok(running) => running,
                    Err(e) => {
                        tracing::error!(error = %e, "Breathing tick failed");
                        false
                    }
                };
                if !running {
                    break;
                }
            }
            tracing::debug!("Breathing tick task finished");
        });

        TickHandle::new(move || task.abort())
    }
}
