//! Task and queue state shapes
//!
//! The running task and the pending queue are plain data on the character;
//! all transitions live in `engine::scheduler` and `engine::queue`.

use serde::{Deserialize, Serialize};

use crate::core::types::LocationId;

/// Real-time countdown for the in-flight task
///
/// Time never comes from a wall clock inside the engine: the host passes
/// `now_ms` into every tick, so tests drive virtual time. Cancelling a
/// timer is dropping the task that holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTimer {
    pub started_at_ms: u64,
    pub duration_ms: u64,
}

impl TaskTimer {
    pub fn schedule(now_ms: u64, duration_ms: u64) -> Self {
        Self {
            started_at_ms: now_ms,
            duration_ms: duration_ms.max(1),
        }
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.started_at_ms)
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.duration_ms.saturating_sub(self.elapsed_ms(now_ms))
    }

    pub fn is_elapsed(&self, now_ms: u64) -> bool {
        self.elapsed_ms(now_ms) >= self.duration_ms
    }

    /// Completion fraction in [0, 1]
    pub fn progress(&self, now_ms: u64) -> f64 {
        (self.elapsed_ms(now_ms) as f64 / self.duration_ms as f64).clamp(0.0, 1.0)
    }
}

/// The single in-flight activity descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveTask {
    pub activity_id: String,
    pub name: String,
    pub location: LocationId,
    /// Town the task was started in (travel completes into another)
    pub town_id: String,
    pub timer: TaskTimer,
    /// Stage minutes debited at start
    pub time_cost_mins: i64,
    /// Destination for travel tasks
    pub travel_to: Option<String>,
    /// Start-time gold was applied; completion must not re-pay it
    pub gold_paid_on_start: bool,
}

/// A pending activity request in the queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedActivity {
    pub location: LocationId,
    pub activity_id: String,
    /// Town context captured at enqueue time
    pub town_id: String,
}
