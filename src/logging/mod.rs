//! # Logging capability.
//!
//! Processes and groups log through an injected [`Logger`]:
//! - [`TracingLogger`] - forwards to `tracing` (default choice for applications)
//! - [`ObservedLogger`] - records calls in memory (tests, diagnostics)
//! - [`NopLogger`] - discards everything
//!
//! With the `logging` feature, [`init_logging`] installs a stdout
//! `tracing-subscriber` so `TracingLogger` output becomes visible.

mod fields;
mod level;
mod logger;
mod observed;
mod tracing_logger;

pub use level::{Level, ParseLevelError};
pub use logger::{Logger, LoggerRef, NopLogger};
pub use observed::{LogEntry, ObservedLogger};
pub use tracing_logger::TracingLogger;

/// Installs a global stdout `tracing` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise records at `level` and above are shown.
/// Returns an error if a global subscriber is already set.
#[cfg(feature = "logging")]
pub fn init_logging(level: Level) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init()
}
