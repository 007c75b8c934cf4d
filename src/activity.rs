//! Bounded, append-only activity log.
//!
//! Every lifecycle component writes timestamped entries here so a user
//! can reconstruct what happened to the session without digging through
//! process logs. Entries are also mirrored to `tracing` at the matching
//! level.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::SystemTime;

/// Default number of entries retained before FIFO eviction kicks in.
pub const DEFAULT_CAPACITY: usize = 256;

/// Severity of an activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A single timestamped lifecycle event.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Wall-clock time the entry was recorded.
    pub timestamp: SystemTime,
    /// Human-readable description of what happened.
    pub message: String,
    /// Severity of the event.
    pub severity: Severity,
}

/// Bounded FIFO sink for lifecycle events.
///
/// Append-only: entries are never edited, and once the capacity is
/// reached the oldest entry is evicted first.
pub struct ActivityLog {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
}

impl ActivityLog {
    /// Create a log retaining at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY))),
            capacity: capacity.max(1),
        }
    }

    /// Append an entry, evicting the oldest when at capacity.
    pub fn push(&self, severity: Severity, message: impl Into<String>) {
        let message = message.into();

        match severity {
            Severity::Info => tracing::info!("{}", message),
            Severity::Warning => tracing::warn!("{}", message),
            Severity::Error => tracing::error!("{}", message),
        }

        // A poisoned lock means a panicking writer; dropping the entry
        // is preferable to propagating a panic out of an event sink.
        if let Ok(mut entries) = self.entries.lock() {
            if entries.len() == self.capacity {
                entries.pop_front();
            }
            entries.push_back(LogEntry {
                timestamp: SystemTime::now(),
                message,
                severity,
            });
        }
    }

    /// Append an informational entry.
    pub fn info(&self, message: impl Into<String>) {
        self.push(Severity::Info, message);
    }

    /// Append a warning entry.
    pub fn warn(&self, message: impl Into<String>) {
        self.push(Severity::Warning, message);
    }

    /// Append an error entry.
    pub fn error(&self, message: impl Into<String>) {
        self.push(Severity::Error, message);
    }

    /// Snapshot of all retained entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|e| e.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_read() {
        let log = ActivityLog::default();
        log.info("connected");
        log.warn("probe slow");

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "connected");
        assert_eq!(entries[0].severity, Severity::Info);
        assert_eq!(entries[1].severity, Severity::Warning);
    }

    #[test]
    fn test_fifo_eviction() {
        let log = ActivityLog::new(3);
        for i in 0..5 {
            log.info(format!("event {}", i));
        }

        let entries = log.entries();
        assert_eq!(entries.len(), 3);
        // Oldest evicted first
        assert_eq!(entries[0].message, "event 2");
        assert_eq!(entries[2].message, "event 4");
    }

    #[test]
    fn test_capacity_floor() {
        let log = ActivityLog::new(0);
        log.info("one");
        log.info("two");
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].message, "two");
    }

    #[test]
    fn test_timestamps_monotonic_enough() {
        let log = ActivityLog::default();
        log.info("first");
        log.info("second");
        let entries = log.entries();
        assert!(entries[0].timestamp <= entries[1].timestamp);
    }

    #[test]
    fn test_empty() {
        let log = ActivityLog::default();
        assert!(log.is_empty());
        log.error("boom");
        assert!(!log.is_empty());
    }
}
