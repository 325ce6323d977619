//! # The background body of one process.
//!
//! Runs setup → work → teardown once and resolves the ready and done cells.
//!
//! ## Flow
//! ```text
//! setup? ──Err──► ready = Err(Setup), done = Err(Setup)          (work/teardown skipped)
//!   │
//!   Ok ──► ready = Ok
//!   │
//! work ──► Ok(Finished)  ─┐
//!      ──► Ok(Cancelled) ─┤  (Err(Canceled) counts as Cancelled)
//!      ──► Err(e)        ─┤  outcome = Err(Work)
//!                         ▼
//!                   teardown?  (errors logged only)
//!                         ▼
//!                   done = outcome
//! ```
//!
//! ## Rules
//! - ready is resolved before done on every path
//! - done is resolved exactly once: the resolver is moved into the branch that resolves it
//! - teardown receives the same token as work, cancelled or not

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::signal::{Outcome, Resolver};
use crate::{
    error::{ProcessError, TaskError},
    logging::LoggerRef,
    tasks::{Completion, HookRef, Work, WorkRef},
};

/// Everything the background task needs, detached from the [`Process`](super::Process) handle.
pub(crate) struct Lifecycle {
    pub name: Arc<str>,
    pub token: CancellationToken,
    pub setup: Option<HookRef>,
    pub teardown: Option<HookRef>,
    pub logger: LoggerRef,
}

impl Lifecycle {
    /// Runs the whole lifecycle. `work = None` stops after the setup phase.
    pub(crate) async fn run(self, work: Option<WorkRef>, ready: Resolver, done: Resolver) {
        let name = &self.name;

        if let Some(setup) = &self.setup {
            self.logger.info_fmt(format_args!("Init {name}"));
            if let Err(source) = setup.call(self.token.clone()).await {
                let err = ProcessError::Setup {
                    name: Arc::clone(name),
                    source,
                };
                self.logger.error_fmt(format_args!("Init {name} failed: {err}"));
                ready.resolve(Err(err.clone()));
                done.resolve(Err(err));
                return;
            }
        }

        self.logger.info_fmt(format_args!("{name} started"));
        ready.resolve(Ok(()));

        let Some(work) = work else {
            done.resolve(Ok(()));
            return;
        };

        let outcome = self.work(work.as_ref()).await;
        self.teardown().await;
        done.resolve(outcome);
    }

    async fn work(&self, work: &dyn Work) -> Outcome {
        let name = &self.name;
        let completion = match work.run(self.token.clone()).await {
            Ok(completion) => completion,
            Err(TaskError::Canceled) => Completion::Cancelled,
            Err(source) => {
                let err = ProcessError::Work {
                    name: Arc::clone(name),
                    source,
                };
                self.logger.error_fmt(format_args!("Process {name} failed: {err}"));
                return Err(err);
            }
        };

        match completion {
            Completion::Finished => self.logger.debug_fmt(format_args!("{name} finished")),
            Completion::Cancelled => self.logger.debug_fmt(format_args!("{name} cancelled")),
        }
        Ok(())
    }

    async fn teardown(&self) {
        let Some(teardown) = &self.teardown else {
            return;
        };
        let name = &self.name;

        self.logger.debug_fmt(format_args!("{name} wait for shutdown"));
        match teardown.call(self.token.clone()).await {
            Ok(()) => self.logger.debug_fmt(format_args!("{name} shutdown finished")),
            Err(source) => {
                let err = ProcessError::Teardown {
                    name: Arc::clone(name),
                    source,
                };
                self.logger.error_fmt(format_args!("{err}"));
            }
        }
    }
}
