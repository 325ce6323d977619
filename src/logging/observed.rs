//! In-memory [`Logger`] for tests and diagnostics.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::fields::Fields;
use super::level::Level;
use super::logger::{Logger, LoggerRef};

/// One recorded log call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Level of the call.
    pub level: Level,
    /// Rendered message, including context fields.
    pub message: String,
}

/// Records every log call in memory.
///
/// Clones (and loggers derived with [`Logger::with`]) share one record, so a
/// test can hand a clone to a process and inspect the original afterwards.
#[derive(Debug, Clone)]
pub struct ObservedLogger {
    min: Level,
    fields: Fields,
    records: Arc<Mutex<Vec<LogEntry>>>,
}

impl ObservedLogger {
    /// Logger recording every level.
    pub fn new() -> Self {
        Self::with_level(Level::Debug)
    }

    /// Logger recording `level` and above.
    pub fn with_level(level: Level) -> Self {
        Self {
            min: level,
            fields: Fields::default(),
            records: Arc::default(),
        }
    }

    /// Shared handle writing into the same record.
    pub fn handle(&self) -> LoggerRef {
        Arc::new(self.clone())
    }

    /// Snapshot of all recorded entries.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    /// Snapshot of the recorded messages.
    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|e| e.message.clone()).collect()
    }

    /// Number of entries recorded at exactly `level`.
    pub fn count(&self, level: Level) -> usize {
        self.lock().iter().filter(|e| e.level == level).count()
    }

    /// Whether any entry at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lock()
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }

    /// Drops all recorded entries.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ObservedLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for ObservedLogger {
    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        let message = format!("{args}{}", self.fields);
        self.lock().push(LogEntry { level, message });
    }

    fn with(&self, key: &str, value: &dyn fmt::Display) -> LoggerRef {
        Arc::new(Self {
            min: self.min,
            fields: self.fields.with(key, value),
            records: Arc::clone(&self.records),
        })
    }

    fn enabled(&self, level: Level) -> bool {
        level >= self.min
    }
}
