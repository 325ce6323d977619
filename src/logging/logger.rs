//! # Logger capability
//!
//! [`Logger`] is the leveled logging interface every procvisor component
//! receives at construction time. There is no process-wide logger: a
//! [`Process`](crate::Process) logs only through the [`LoggerRef`] it was
//! configured with.
//!
//! Each level has a plain variant taking `&str` and a formatted variant taking
//! [`fmt::Arguments`]:
//! ```rust
//! use procvisor::{Logger, ObservedLogger};
//!
//! let log = ObservedLogger::new();
//! log.info("ready");
//! log.info_fmt(format_args!("{} workers", 4));
//! assert_eq!(log.messages(), vec!["ready", "4 workers"]);
//! ```

use std::fmt;
use std::sync::Arc;

use super::level::Level;

/// Shared handle to a logger.
pub type LoggerRef = Arc<dyn Logger>;

/// Leveled logging sink.
pub trait Logger: Send + Sync + 'static {
    /// Emits one record.
    fn log(&self, level: Level, args: fmt::Arguments<'_>);

    /// Returns a logger that attaches `key=value` to every record.
    fn with(&self, key: &str, value: &dyn fmt::Display) -> LoggerRef;

    /// Whether records at `level` are kept; callers may skip formatting otherwise.
    fn enabled(&self, _level: Level) -> bool {
        true
    }

    fn debug(&self, msg: &str) {
        self.log(Level::Debug, format_args!("{msg}"));
    }

    fn info(&self, msg: &str) {
        self.log(Level::Info, format_args!("{msg}"));
    }

    fn warn(&self, msg: &str) {
        self.log(Level::Warn, format_args!("{msg}"));
    }

    fn error(&self, msg: &str) {
        self.log(Level::Error, format_args!("{msg}"));
    }

    fn debug_fmt(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    fn info_fmt(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    fn warn_fmt(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    fn error_fmt(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }
}

/// Logger that drops every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopLogger;

impl NopLogger {
    /// Returns the logger as a shared handle.
    pub fn arc() -> LoggerRef {
        Arc::new(NopLogger)
    }
}

impl Logger for NopLogger {
    fn log(&self, _level: Level, _args: fmt::Arguments<'_>) {}

    fn with(&self, _key: &str, _value: &dyn fmt::Display) -> LoggerRef {
        Arc::new(NopLogger)
    }

    fn enabled(&self, _level: Level) -> bool {
        false
    }
}
