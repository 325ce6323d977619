use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::process::Process;
use crate::{
    logging::{LoggerRef, TracingLogger},
    tasks::HookRef,
};

/// Builder for a [`Process`] with optional hooks, parent token and logger.
///
/// Defaults: fresh root token, no hooks, [`TracingLogger`] at `info`.
///
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use procvisor::{HookFn, NopLogger, Process, TaskError};
///
/// let root = CancellationToken::new();
/// let process = Process::builder("db")
///     .with_parent(&root)
///     .with_setup(HookFn::arc(|_ctx: CancellationToken| async { Ok::<_, TaskError>(()) }))
///     .with_logger(NopLogger::arc())
///     .build();
///
/// root.cancel();
/// assert!(process.is_cancelled());
/// ```
pub struct ProcessBuilder {
    name: Arc<str>,
    parent: Option<CancellationToken>,
    setup: Option<HookRef>,
    teardown: Option<HookRef>,
    logger: Option<LoggerRef>,
}

impl ProcessBuilder {
    /// Creates a new builder with the given process name.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            setup: None,
            teardown: None,
            logger: None,
        }
    }

    /// Derives the process token from `parent` instead of a fresh root.
    pub fn with_parent(mut self, parent: &CancellationToken) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    pub fn with_setup(mut self, hook: HookRef) -> Self {
        self.setup = Some(hook);
        self
    }

    pub fn with_teardown(mut self, hook: HookRef) -> Self {
        self.teardown = Some(hook);
        self
    }

    pub fn with_logger(mut self, logger: LoggerRef) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Builds the process.
    pub fn build(self) -> Process {
        let parent = self.parent.unwrap_or_default();
        let logger = self.logger.unwrap_or_else(|| TracingLogger::new().arc());
        Process::from_parts(self.name, &parent, self.setup, self.teardown, logger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::ObservedLogger;

    #[test]
    fn test_parent_cancellation_reaches_process() {
        let root = CancellationToken::new();
        let process = Process::builder("child")
            .with_parent(&root)
            .with_logger(ObservedLogger::new().handle())
            .build();

        assert!(!process.is_cancelled());
        root.cancel();
        assert!(process.is_cancelled());
    }

    #[test]
    fn test_process_token_does_not_cancel_parent() {
        let root = CancellationToken::new();
        let process = Process::builder("child").with_parent(&root).build();

        process.token().cancel();
        assert!(!root.is_cancelled());
        assert_eq!(process.name(), "child");
    }
}
