//! Error types used by procvisor processes and groups.
//!
//! This module defines three error enums:
//!
//! - [`TaskError`] — returned by setup/teardown hooks and work functions.
//! - [`ProcessError`] — the outcome carried by a process's ready and done signals.
//! - [`RuntimeError`] — errors raised by a [`ProcessGroup`](crate::ProcessGroup).
//!
//! All of them provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// # Errors produced by hooks and work functions.
///
/// A work function that notices cancellation should return
/// `Ok(Completion::Cancelled)`. Returning [`TaskError::Canceled`] is accepted
/// as well and is **not** reported as a failure.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Execution failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Execution stopped because the cancellation token fired.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use procvisor::TaskError;
    ///
    /// let err = TaskError::fail("connection refused");
    /// assert_eq!(err.to_string(), "execution failed: connection refused");
    /// ```
    pub fn fail(error: impl Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }
}

/// # Outcome errors of a supervised process.
///
/// Only [`ProcessError::Setup`] and [`ProcessError::Work`] are delivered on a
/// done signal by a regular lifecycle, and never both for the same run.
/// [`ProcessError::Teardown`] is only ever logged.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// The setup hook failed; the work function never ran.
    #[error("{name}: setup failed: {source}")]
    Setup {
        /// Process name.
        name: Arc<str>,
        /// Error returned by the setup hook.
        source: TaskError,
    },

    /// The work function failed; teardown still ran.
    #[error("{name}: process failed: {source}")]
    Work {
        /// Process name.
        name: Arc<str>,
        /// Error returned by the work function.
        source: TaskError,
    },

    /// The teardown hook failed.
    #[error("{name}: shutdown failed: {source}")]
    Teardown {
        /// Process name.
        name: Arc<str>,
        /// Error returned by the teardown hook.
        source: TaskError,
    },

    /// `stop` gave up waiting before the done signal resolved.
    ///
    /// The background task may still be running.
    #[error("{name}: stop deadline exceeded after {waited:?}")]
    StopTimeout {
        /// Process name.
        name: Arc<str>,
        /// How long `stop` waited.
        waited: Duration,
    },

    /// The background task ended without resolving its signal (panic).
    #[error("{name}: background task aborted")]
    Aborted {
        /// Process name.
        name: Arc<str>,
    },

    /// `start` was called on a process that was already started.
    #[error("{name}: already started")]
    AlreadyStarted {
        /// Process name.
        name: Arc<str>,
    },
}

impl ProcessError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use procvisor::{ProcessError, TaskError};
    ///
    /// let err = ProcessError::Setup { name: "db".into(), source: TaskError::fail("boom") };
    /// assert_eq!(err.as_label(), "process_setup_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ProcessError::Setup { .. } => "process_setup_failed",
            ProcessError::Work { .. } => "process_work_failed",
            ProcessError::Teardown { .. } => "process_teardown_failed",
            ProcessError::StopTimeout { .. } => "process_stop_timeout",
            ProcessError::Aborted { .. } => "process_aborted",
            ProcessError::AlreadyStarted { .. } => "process_already_started",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ProcessError::Setup { source, .. } => format!("setup: {}", source.as_message()),
            ProcessError::Work { source, .. } => format!("work: {}", source.as_message()),
            ProcessError::Teardown { source, .. } => format!("teardown: {}", source.as_message()),
            ProcessError::StopTimeout { waited, .. } => format!("stop timeout: {waited:?}"),
            ProcessError::Aborted { .. } => "aborted".to_string(),
            ProcessError::AlreadyStarted { .. } => "already started".to_string(),
        }
    }

    /// Name of the process this error belongs to.
    pub fn process(&self) -> &str {
        let name = match self {
            ProcessError::Setup { name, .. }
            | ProcessError::Work { name, .. }
            | ProcessError::Teardown { name, .. }
            | ProcessError::StopTimeout { name, .. }
            | ProcessError::Aborted { name }
            | ProcessError::AlreadyStarted { name } => name,
        };
        name
    }

    /// The hook or work error behind this outcome, if any.
    pub fn task_error(&self) -> Option<&TaskError> {
        match self {
            ProcessError::Setup { source, .. }
            | ProcessError::Work { source, .. }
            | ProcessError::Teardown { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// # Errors produced by a process group.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some processes did not terminate in time.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of processes whose done signal did not resolve in time.
        stuck: Vec<String>,
    },

    /// Every process terminated, but some of them reported errors.
    #[error("{} process(es) failed", errors.len())]
    ProcessesFailed {
        /// Terminal errors, in group order.
        errors: Vec<ProcessError>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use procvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::ProcessesFailed { .. } => "runtime_processes_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck processes={stuck:?}")
            }
            RuntimeError::ProcessesFailed { errors } => {
                let names: Vec<&str> = errors.iter().map(ProcessError::process).collect();
                format!("failed processes={names:?}")
            }
        }
    }
}
