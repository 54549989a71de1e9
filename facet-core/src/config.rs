//! Scheduler configuration.
//!
//! The configuration is plain data so hosts can load it alongside the rest
//! of their settings (JSON, TOML, ...). Missing fields fall back to
//! [`SchedulerConfig::default`].

use serde::{Deserialize, Serialize};

/// Tunables for a [`Scheduler`](crate::schedule::Scheduler).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Maximum number of passes one outermost flush may take.
    ///
    /// Each pass runs the tasks queued by the previous one, so a pair of
    /// tasks that keep rescheduling each other never settles. When the limit
    /// is hit the flush is aborted like a panicking task. `None`, the
    /// default, flushes until the queues are empty.
    pub max_flush_passes: Option<usize>,
}

impl SchedulerConfig {
    /// A configuration without a pass limit.
    pub fn unbounded() -> Self {
        Self {
            max_flush_passes: None,
        }
    }

    /// Abort a flush after `limit` passes.
    pub fn with_max_flush_passes(mut self, limit: usize) -> Self {
        self.max_flush_passes = Some(limit);
        self
    }
}
