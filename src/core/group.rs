//! # ProcessGroup: shared shutdown for several processes.
//!
//! A [`ProcessGroup`] owns a root [`CancellationToken`] and a list of
//! [`Process`]es built as its children. It does not restart anything; it only
//! waits for, or shuts down, the whole set.
//!
//! ## Shutdown path
//! ```text
//! run_until_signal()
//!   ├─ all done signals resolved ─────────► aggregate outcomes
//!   └─ OS signal (SIGINT/SIGTERM/SIGQUIT) ─► shutdown()
//!                                             ├─ root token.cancel()  → every child token
//!                                             └─ Process::stop_until(now + grace) for each
//!                                                  ├─ all resolved → Ok / ProcessesFailed
//!                                                  └─ some timed out → GraceExceeded { stuck }
//! ```
//!
//! Stuck processes keep running; the group reports them and returns.

use std::sync::Arc;

use futures::future::join_all;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::{builder::ProcessBuilder, config::Config, process::Process, shutdown, signal::Outcome};
use crate::{
    error::{ProcessError, RuntimeError},
    logging::LoggerRef,
};

/// A set of processes that are waited for and shut down together.
pub struct ProcessGroup {
    cfg: Config,
    token: CancellationToken,
    logger: LoggerRef,
    processes: Vec<Process>,
}

impl ProcessGroup {
    /// Creates an empty group with its own root token.
    pub fn new(cfg: Config, logger: LoggerRef) -> Self {
        Self {
            cfg,
            token: CancellationToken::new(),
            logger,
            processes: Vec::new(),
        }
    }

    /// Root token; cancelling it cancels every process built from [`ProcessGroup::builder`].
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Process builder preset with this group's token and logger.
    pub fn builder(&self, name: impl Into<Arc<str>>) -> ProcessBuilder {
        Process::builder(name)
            .with_parent(&self.token)
            .with_logger(Arc::clone(&self.logger))
    }

    /// Adds a process to the group.
    pub fn push(&mut self, process: Process) {
        self.processes.push(process);
    }

    /// Processes in insertion order.
    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Waits until every process has terminated on its own.
    pub async fn wait(&self) -> Result<(), RuntimeError> {
        let outcomes = join_all(self.processes.iter().map(|p| {
            let done = p.done();
            async move { done.wait().await }
        }))
        .await;
        self.aggregate(outcomes)
    }

    /// Cancels the group and waits up to `cfg.grace` for every process.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let grace = self.cfg.grace;
        self.logger.info_fmt(format_args!(
            "shutdown requested; stopping {} process(es) within {grace:?}",
            self.processes.len()
        ));
        self.token.cancel();

        let deadline = Instant::now() + grace;
        let outcomes = join_all(self.processes.iter().map(|p| p.stop_until(deadline))).await;

        let stuck: Vec<String> = outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                Err(ProcessError::StopTimeout { name, .. }) => Some(name.to_string()),
                _ => None,
            })
            .collect();
        if !stuck.is_empty() {
            // GraceExceeded carries only the stuck names.
            for err in outcomes.iter().filter_map(|outcome| outcome.as_ref().err()) {
                if !matches!(err, ProcessError::StopTimeout { .. }) {
                    let name = err.process();
                    self.logger
                        .error_fmt(format_args!("{name} failed during shutdown: {err}"));
                }
            }
            self.logger
                .warn_fmt(format_args!("grace {grace:?} exceeded; stuck: {stuck:?}"));
            return Err(RuntimeError::GraceExceeded { grace, stuck });
        }

        self.logger.info("all processes stopped within grace");
        self.aggregate(outcomes)
    }

    /// Waits for all processes to finish, or for an OS termination signal
    /// followed by [`ProcessGroup::shutdown`].
    pub async fn run_until_signal(&self) -> Result<(), RuntimeError> {
        tokio::select! {
            res = shutdown::wait_for_shutdown_signal() => match res {
                Ok(signal) => {
                    self.logger.info_fmt(format_args!("{signal} received"));
                    self.shutdown().await
                }
                Err(e) => {
                    self.logger.error_fmt(format_args!("signal registration failed: {e}"));
                    self.wait().await
                }
            },
            res = self.wait() => res,
        }
    }

    fn aggregate(&self, outcomes: Vec<Outcome>) -> Result<(), RuntimeError> {
        let errors: Vec<ProcessError> = outcomes.into_iter().filter_map(Result::err).collect();
        if errors.is_empty() {
            return Ok(());
        }
        for err in &errors {
            self.logger.error_fmt(format_args!("{err}"));
        }
        Err(RuntimeError::ProcessesFailed { errors })
    }
}
