//! # Group runtime configuration.
//!
//! [`Config`] holds the settings used by [`ProcessGroup`](crate::ProcessGroup).
//!
//! ## Sentinel values
//! - `grace = 0s` → do not wait at all; every unresolved process is reported as stuck

use std::time::Duration;

/// Configuration for a [`ProcessGroup`](crate::ProcessGroup).
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time to wait for processes to terminate after the group token is cancelled.
    ///
    /// When exceeded, shutdown returns `RuntimeError::GraceExceeded` naming
    /// the processes whose done signal is still unresolved. Those processes
    /// are not aborted.
    pub grace: Duration,
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `grace = 60s`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(60),
        }
    }
}
