//! `tracing`-backed [`Logger`].

use std::fmt;
use std::sync::Arc;

use super::fields::Fields;
use super::level::Level;
use super::logger::{Logger, LoggerRef};

/// Forwards records to [`tracing`] events with target `procvisor`.
///
/// Records below the configured minimum level are dropped before they reach
/// the subscriber; the subscriber's own filter applies on top.
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    min: Level,
    fields: Fields,
}

impl TracingLogger {
    /// Logger keeping `info` and above.
    pub fn new() -> Self {
        Self::default()
    }

    /// Logger keeping `level` and above.
    pub fn with_level(level: Level) -> Self {
        Self {
            min: level,
            fields: Fields::default(),
        }
    }

    /// Returns the logger as a shared handle.
    pub fn arc(self) -> LoggerRef {
        Arc::new(self)
    }

    /// Minimum level kept by this logger.
    pub fn level(&self) -> Level {
        self.min
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        let fields = &self.fields;
        match level {
            Level::Debug => tracing::debug!(target: "procvisor", "{args}{fields}"),
            Level::Info => tracing::info!(target: "procvisor", "{args}{fields}"),
            Level::Warn => tracing::warn!(target: "procvisor", "{args}{fields}"),
            Level::Error => tracing::error!(target: "procvisor", "{args}{fields}"),
        }
    }

    fn with(&self, key: &str, value: &dyn fmt::Display) -> LoggerRef {
        Arc::new(Self {
            min: self.min,
            fields: self.fields.with(key, value),
        })
    }

    fn enabled(&self, level: Level) -> bool {
        level >= self.min
    }
}
