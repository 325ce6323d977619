//! # Process: one supervised background task.
//!
//! A [`Process`] runs a single [`Work`](crate::Work) through setup → run →
//! teardown on its own tokio task and reports through two [`Signal`]s.
//!
//! ## Architecture
//! ```text
//! Process::configure / Process::builder
//!        │  token = parent.child_token(), done = fresh cell
//!        ▼
//! Process::start(work) ──► tokio::spawn(Lifecycle::run) ──► returns ready Signal
//!                                 │
//!                                 ├─ setup hook        → resolves ready
//!                                 ├─ work(token)
//!                                 ├─ teardown hook
//!                                 └─ resolves done (exactly once)
//!
//! Process::stop(timeout) ──► token.cancel() ──► wait done ≤ timeout
//! Process::done()        ──► clone of the done Signal
//! ```
//!
//! ## Rules
//! - Cancellation is cooperative: `stop` only flips the token.
//! - `stop`'s timeout bounds the caller's wait, not the task. Work that never
//!   observes cancellation keeps running after `stop` returns
//!   [`ProcessError::StopTimeout`]; it is not aborted.
//! - Panics inside hooks or work are caught at the task boundary, logged, and
//!   observed as [`ProcessError::Aborted`].
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use procvisor::{Completion, Process, TaskError, TracingLogger, WorkFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let process = Process::configure("ticker", None, None, TracingLogger::new().arc());
//!
//!     let ready = process.start(WorkFn::arc(|ctx: CancellationToken| async move {
//!         while !ctx.is_cancelled() {
//!             tokio::time::sleep(Duration::from_millis(5)).await;
//!         }
//!         Ok::<_, TaskError>(Completion::Cancelled)
//!     }));
//!     ready.wait().await?;
//!
//!     process.stop(Duration::from_secs(1)).await?;
//!     Ok(())
//! }
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use super::builder::ProcessBuilder;
use super::lifecycle::Lifecycle;
use super::signal::{self, Outcome, Resolver, Signal};
use crate::{
    error::ProcessError,
    logging::LoggerRef,
    tasks::{HookRef, WorkRef},
};

/// Handle to one supervised background task.
pub struct Process {
    name: Arc<str>,
    token: CancellationToken,
    setup: Option<HookRef>,
    teardown: Option<HookRef>,
    logger: LoggerRef,
    done: Signal,
    /// Writer of `done`; taken exactly once by `start` (or by `stop` before any start).
    done_resolver: Mutex<Option<Resolver>>,
}

impl Process {
    /// Configures a process whose token is derived from a fresh root token.
    pub fn configure(
        name: impl Into<Arc<str>>,
        setup: Option<HookRef>,
        teardown: Option<HookRef>,
        logger: LoggerRef,
    ) -> Self {
        Self::from_parts(name.into(), &CancellationToken::new(), setup, teardown, logger)
    }

    /// Creates a builder for configuring a process with a fluent API.
    pub fn builder(name: impl Into<Arc<str>>) -> ProcessBuilder {
        ProcessBuilder::new(name)
    }

    pub(crate) fn from_parts(
        name: Arc<str>,
        parent: &CancellationToken,
        setup: Option<HookRef>,
        teardown: Option<HookRef>,
        logger: LoggerRef,
    ) -> Self {
        let (resolver, done) = signal::pair(Arc::clone(&name));
        Self {
            name,
            token: parent.child_token(),
            setup,
            teardown,
            logger,
            done,
            done_resolver: Mutex::new(Some(resolver)),
        }
    }

    /// Starts the lifecycle on a background task and returns the ready signal.
    ///
    /// Returns immediately; must be called within a tokio runtime. A second
    /// call returns a signal resolved with [`ProcessError::AlreadyStarted`]
    /// and leaves the running lifecycle untouched.
    pub fn start(&self, work: WorkRef) -> Signal {
        self.launch(Some(work))
    }

    /// Starts a lifecycle without a work function.
    ///
    /// Setup runs and resolves ready; done then resolves with the setup outcome.
    /// Teardown does not run.
    pub fn start_setup_only(&self) -> Signal {
        self.launch(None)
    }

    fn launch(&self, work: Option<WorkRef>) -> Signal {
        let Some(done) = self.take_resolver() else {
            let name = &self.name;
            self.logger.error_fmt(format_args!("{name} already started"));
            let err = ProcessError::AlreadyStarted {
                name: Arc::clone(name),
            };
            return Signal::resolved(Arc::clone(name), Err(err));
        };

        let (ready, ready_signal) = signal::pair(Arc::clone(&self.name));
        let lifecycle = Lifecycle {
            name: Arc::clone(&self.name),
            token: self.token.clone(),
            setup: self.setup.clone(),
            teardown: self.teardown.clone(),
            logger: Arc::clone(&self.logger),
        };
        let name = Arc::clone(&self.name);
        let logger = Arc::clone(&self.logger);

        tokio::spawn(async move {
            let run = AssertUnwindSafe(lifecycle.run(work, ready, done));
            if let Err(panic) = run.catch_unwind().await {
                let info = panic_message(panic.as_ref());
                logger.error_fmt(format_args!("{name} panicked: {info}"));
            }
        });
        ready_signal
    }

    /// Cancels the process and waits up to `timeout` for its terminal outcome.
    pub async fn stop(&self, timeout: Duration) -> Outcome {
        self.stop_until(Instant::now() + timeout).await
    }

    /// Cancels the process and waits until `deadline` for its terminal outcome.
    ///
    /// Returns the done outcome (`Ok(())` for a clean lifecycle), or
    /// [`ProcessError::StopTimeout`] if the deadline passes first. Stopping a
    /// process that was never started resolves its done signal with `Ok(())`.
    pub async fn stop_until(&self, deadline: Instant) -> Outcome {
        let name = &self.name;
        self.logger.info_fmt(format_args!("{name} shutdown start"));
        self.token.cancel();

        if let Some(done) = self.take_resolver() {
            self.logger.debug_fmt(format_args!("{name} was never started"));
            done.resolve(Ok(()));
        }

        self.logger.debug_fmt(format_args!("{name} wait for shutdown done"));
        let started = Instant::now();
        let outcome = match time::timeout_at(deadline, self.done.wait()).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => Err(ProcessError::StopTimeout {
                name: Arc::clone(name),
                waited: started.elapsed(),
            }),
        };

        match &outcome {
            Ok(()) => self.logger.info_fmt(format_args!("{name} done")),
            Err(err) => self.logger.error_fmt(format_args!("{name} stop failed: {err}")),
        }
        outcome
    }

    /// The done signal, for independent observation.
    pub fn done(&self) -> Signal {
        self.done.clone()
    }

    /// Process name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The token handed to hooks and work.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Whether cancellation was requested (by `stop` or a parent token).
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether `start` (or `stop`) already consumed this process.
    pub fn is_started(&self) -> bool {
        self.resolver_slot().is_none()
    }

    fn take_resolver(&self) -> Option<Resolver> {
        self.resolver_slot().take()
    }

    fn resolver_slot(&self) -> std::sync::MutexGuard<'_, Option<Resolver>> {
        self.done_resolver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Process")
            .field("name", &self.name)
            .field("cancelled", &self.token.is_cancelled())
            .field("setup", &self.setup.is_some())
            .field("teardown", &self.teardown.is_some())
            .finish_non_exhaustive()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::logging::{Level, ObservedLogger};
    use crate::tasks::{Completion, HookFn, WorkFn};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TICK: Duration = Duration::from_millis(10);

    fn counting_work(counter: Arc<AtomicUsize>) -> WorkRef {
        WorkFn::arc(move |ctx: CancellationToken| {
            let counter = counter.clone();
            async move {
                tokio::select! {
                    _ = ctx.cancelled() => Ok(Completion::Cancelled),
                    _ = time::sleep(TICK) => {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, TaskError>(Completion::Finished)
                    }
                }
            }
        })
    }

    fn recording_hook(events: Arc<Mutex<Vec<&'static str>>>, label: &'static str) -> HookRef {
        HookFn::arc(move |_ctx: CancellationToken| {
            let events = events.clone();
            async move {
                events.lock().unwrap().push(label);
                Ok::<_, TaskError>(())
            }
        })
    }

    #[tokio::test]
    async fn test_finishes_without_hooks() {
        let log = ObservedLogger::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let process = Process::configure("finish", None, None, log.handle());

        process.start(counting_work(counter.clone())).wait().await.unwrap();
        assert_eq!(process.done().wait().await, Ok(()));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(log.contains(Level::Info, "finish started"));
        assert!(log.contains(Level::Debug, "finish finished"));
    }

    #[tokio::test]
    async fn test_stop_after_natural_finish_is_ok() {
        let counter = Arc::new(AtomicUsize::new(0));
        let process = Process::configure("finish-stop", None, None, ObservedLogger::new().handle());

        process.start(counting_work(counter.clone())).wait().await.unwrap();
        time::sleep(TICK * 5).await;

        assert_eq!(process.stop(Duration::from_secs(1)).await, Ok(()));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_polling_loop() {
        let log = ObservedLogger::new();
        let entered = Arc::new(AtomicUsize::new(0));
        let iterations = Arc::new(AtomicUsize::new(0));
        let process = Process::configure("cancel", None, None, log.handle());

        let work = {
            let entered = entered.clone();
            let iterations = iterations.clone();
            WorkFn::arc(move |ctx: CancellationToken| {
                let entered = entered.clone();
                let iterations = iterations.clone();
                async move {
                    entered.fetch_add(1, Ordering::SeqCst);
                    loop {
                        tokio::select! {
                            _ = ctx.cancelled() => return Ok::<_, TaskError>(Completion::Cancelled),
                            _ = time::sleep(TICK) => {
                                iterations.fetch_add(1, Ordering::SeqCst);
                            }
                        }
                    }
                }
            })
        };

        process.start(work).wait().await.unwrap();
        time::sleep(TICK * 5).await;

        assert_eq!(process.stop(Duration::from_secs(1)).await, Ok(()));
        assert!(process.is_cancelled());

        let after_stop = iterations.load(Ordering::SeqCst);
        time::sleep(TICK * 3).await;
        assert_eq!(iterations.load(Ordering::SeqCst), after_stop);
        assert_eq!(entered.load(Ordering::SeqCst), 1);
        assert!(log.contains(Level::Debug, "cancel cancelled"));
        assert!(log.contains(Level::Info, "cancel done"));
    }

    #[tokio::test]
    async fn test_setup_work_teardown_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let process = Process::configure(
            "ordered",
            Some(recording_hook(events.clone(), "setup")),
            Some(recording_hook(events.clone(), "teardown")),
            ObservedLogger::new().handle(),
        );

        let work = {
            let events = events.clone();
            WorkFn::arc(move |_ctx: CancellationToken| {
                let events = events.clone();
                async move {
                    events.lock().unwrap().push("work");
                    Ok::<_, TaskError>(Completion::Finished)
                }
            })
        };

        process.start(work).wait().await.unwrap();
        assert_eq!(process.done().wait().await, Ok(()));
        assert_eq!(*events.lock().unwrap(), vec!["setup", "work", "teardown"]);
    }

    #[tokio::test]
    async fn test_setup_failure_skips_work_and_teardown() {
        let log = ObservedLogger::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let torn_down = Arc::new(Mutex::new(Vec::new()));

        let setup: HookRef = HookFn::arc(|_ctx: CancellationToken| async {
            Err::<(), _>(TaskError::fail("Init failed"))
        });
        let process = Process::configure(
            "init-fail",
            Some(setup),
            Some(recording_hook(torn_down.clone(), "teardown")),
            log.handle(),
        );

        let expected = Err(ProcessError::Setup {
            name: "init-fail".into(),
            source: TaskError::fail("Init failed"),
        });
        assert_eq!(process.start(counting_work(counter.clone())).wait().await, expected);
        assert_eq!(process.done().wait().await, expected);

        time::sleep(TICK * 3).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(torn_down.lock().unwrap().is_empty());
        assert!(log.contains(Level::Error, "Init init-fail failed"));
    }

    #[tokio::test]
    async fn test_teardown_failure_is_logged_only() {
        let log = ObservedLogger::new();
        let teardown: HookRef = HookFn::arc(|_ctx: CancellationToken| async {
            Err::<(), _>(TaskError::fail("Shutdown failed"))
        });
        let process = Process::configure("td-fail", None, Some(teardown), log.handle());

        process
            .start(counting_work(Arc::new(AtomicUsize::new(0))))
            .wait()
            .await
            .unwrap();

        assert_eq!(process.done().wait().await, Ok(()));
        assert!(log.contains(Level::Error, "td-fail: shutdown failed"));
    }

    #[tokio::test]
    async fn test_work_failure_is_delivered_and_teardown_runs() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let process = Process::configure(
            "work-fail",
            None,
            Some(recording_hook(events.clone(), "teardown")),
            ObservedLogger::new().handle(),
        );
        let work = WorkFn::arc(|_ctx: CancellationToken| async {
            Err::<Completion, _>(TaskError::fail("boom"))
        });

        assert_eq!(process.start(work).wait().await, Ok(()));
        assert_eq!(
            process.done().wait().await,
            Err(ProcessError::Work {
                name: "work-fail".into(),
                source: TaskError::fail("boom"),
            })
        );
        assert_eq!(*events.lock().unwrap(), vec!["teardown"]);
    }

    #[tokio::test]
    async fn test_canceled_error_counts_as_clean_exit() {
        let process = Process::configure("canceled", None, None, ObservedLogger::new().handle());
        let work = WorkFn::arc(|ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Err::<Completion, _>(TaskError::Canceled)
        });

        process.start(work).wait().await.unwrap();
        assert_eq!(process.stop(Duration::from_secs(1)).await, Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_timeout_leaves_task_running() {
        let log = ObservedLogger::new();
        let process = Process::configure("stubborn", None, None, log.handle());
        let work = WorkFn::arc(|_ctx: CancellationToken| async {
            time::sleep(Duration::from_secs(3600)).await;
            Ok::<_, TaskError>(Completion::Finished)
        });

        process.start(work).wait().await.unwrap();
        let res = process.stop(Duration::from_millis(20)).await;

        assert!(matches!(res, Err(ProcessError::StopTimeout { .. })), "got {res:?}");
        assert!(!process.done().is_resolved());
        assert!(log.contains(Level::Error, "stubborn stop failed"));
    }

    #[tokio::test]
    async fn test_done_can_be_read_repeatedly() {
        let process = Process::configure("twice", None, None, ObservedLogger::new().handle());
        process.start(counting_work(Arc::new(AtomicUsize::new(0))));

        let done = process.done();
        assert_eq!(done.wait().await, Ok(()));
        assert_eq!(done.try_get(), Some(Ok(())));
        assert_eq!(process.done().wait().await, Ok(()));
    }

    #[tokio::test]
    async fn test_second_start_reports_already_started() {
        let counter = Arc::new(AtomicUsize::new(0));
        let process = Process::configure("again", None, None, ObservedLogger::new().handle());

        process.start(counting_work(counter.clone())).wait().await.unwrap();
        let second = process.start(counting_work(counter.clone())).wait().await;

        assert_eq!(second, Err(ProcessError::AlreadyStarted { name: "again".into() }));
        assert_eq!(process.done().wait().await, Ok(()));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_work_reports_aborted() {
        let log = ObservedLogger::new();
        let process = Process::configure("panics", None, None, log.handle());
        let work = WorkFn::arc(|_ctx: CancellationToken| async {
            let explode = true;
            if explode {
                panic!("boom");
            }
            Ok::<_, TaskError>(Completion::Finished)
        });

        assert_eq!(process.start(work).wait().await, Ok(()));
        assert_eq!(
            process.done().wait().await,
            Err(ProcessError::Aborted { name: "panics".into() })
        );
        time::sleep(TICK).await;
        assert!(log.contains(Level::Error, "panics panicked: boom"));
    }

    #[tokio::test]
    async fn test_stop_before_start_resolves_done() {
        let process = Process::configure("idle", None, None, ObservedLogger::new().handle());
        assert!(!process.is_started());

        assert_eq!(process.stop(Duration::from_millis(50)).await, Ok(()));
        assert!(process.is_started());
        assert!(process.done().is_resolved());
    }

    #[tokio::test]
    async fn test_setup_only_resolves_done_after_ready() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let process = Process::configure(
            "setup-only",
            Some(recording_hook(events.clone(), "setup")),
            Some(recording_hook(events.clone(), "teardown")),
            ObservedLogger::new().handle(),
        );

        assert_eq!(process.start_setup_only().wait().await, Ok(()));
        assert_eq!(process.done().wait().await, Ok(()));
        assert_eq!(*events.lock().unwrap(), vec!["setup"]);
    }

    #[tokio::test]
    async fn test_teardown_runs_with_cancelled_token_after_stop() {
        let seen = Arc::new(Mutex::new(None));
        let teardown: HookRef = {
            let seen = seen.clone();
            HookFn::arc(move |ctx: CancellationToken| {
                let seen = seen.clone();
                async move {
                    *seen.lock().unwrap() = Some(ctx.is_cancelled());
                    Ok::<_, TaskError>(())
                }
            })
        };
        let process = Process::configure(
            "td-token",
            None,
            Some(teardown),
            ObservedLogger::new().handle(),
        );
        let work = WorkFn::arc(|ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Ok::<_, TaskError>(Completion::Cancelled)
        });

        process.start(work).wait().await.unwrap();
        assert_eq!(*seen.lock().unwrap(), None);

        assert_eq!(process.stop(Duration::from_secs(1)).await, Ok(()));
        assert_eq!(*seen.lock().unwrap(), Some(true));
    }

    #[tokio::test]
    async fn test_ready_resolves_before_done_on_success() {
        let process = Process::configure("ready-first", None, None, ObservedLogger::new().handle());
        let ready = process.start(counting_work(Arc::new(AtomicUsize::new(0))));

        assert_eq!(process.done().wait().await, Ok(()));
        assert!(ready.is_resolved());
        assert_eq!(ready.try_get(), Some(Ok(())));
    }

    #[tokio::test]
    async fn test_ready_resolves_before_done_on_setup_failure() {
        let setup: HookRef = HookFn::arc(|_ctx: CancellationToken| async {
            Err::<(), _>(TaskError::fail("no db"))
        });
        let process = Process::configure(
            "ready-fail",
            Some(setup),
            None,
            ObservedLogger::new().handle(),
        );
        let ready = process.start(counting_work(Arc::new(AtomicUsize::new(0))));

        let done = process.done().wait().await;
        assert!(ready.is_resolved());
        assert_eq!(ready.try_get(), Some(done));
    }

    #[tokio::test]
    async fn test_panicking_setup_aborts_both_signals() {
        let log = ObservedLogger::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let setup: HookRef = HookFn::arc(|_ctx: CancellationToken| async {
            let explode = true;
            if explode {
                panic!("setup exploded");
            }
            Ok::<_, TaskError>(())
        });
        let process = Process::configure("setup-panic", Some(setup), None, log.handle());

        let aborted = Err(ProcessError::Aborted {
            name: "setup-panic".into(),
        });
        assert_eq!(process.start(counting_work(counter.clone())).wait().await, aborted);
        assert_eq!(process.done().wait().await, aborted);

        time::sleep(TICK * 3).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(log.contains(Level::Error, "setup-panic panicked: setup exploded"));
    }
}
