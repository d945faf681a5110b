//! Bounded in-game event log
//!
//! Chronological order, oldest evicted once the cap is reached. This is the
//! player-facing history; diagnostics go through `tracing` instead.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::config::LOG_CAPACITY;
use crate::core::types::LogCategory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Host-supplied timestamp (same clock that drives task ticks)
    pub at_ms: u64,
    pub category: LogCategory,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, at_ms: u64, category: LogCategory, message: impl Into<String>) {
        if self.entries.len() >= LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            at_ms,
            category,
            message: message.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries oldest-first
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eviction_past_cap() {
        let mut log = EventLog::new();
        for i in 0..(LOG_CAPACITY + 20) {
            log.push(i as u64, LogCategory::System, format!("entry {}", i));
        }
        assert_eq!(log.len(), LOG_CAPACITY);
        // the oldest surviving entry is #20
        assert_eq!(log.iter().next().unwrap().message, "entry 20");
        assert_eq!(
            log.latest().unwrap().message,
            format!("entry {}", LOG_CAPACITY + 19)
        );
    }
}
