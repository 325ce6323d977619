//! # procvisor
//!
//! **procvisor** supervises single long-lived background tasks through a
//! three-phase lifecycle: optional setup, a cancellable run, optional teardown.
//!
//! Each [`Process`] owns exactly one tokio task and talks to its caller through
//! two single-assignment [`Signal`]s and a shared [`CancellationToken`](tokio_util::sync::CancellationToken):
//! - **ready** resolves with the outcome of the setup phase;
//! - **done** resolves exactly once with the terminal outcome of the lifecycle.
//!
//! ## Architecture
//! ```text
//!   caller                                   background task (one per Process)
//!   ──────                                   ─────────────────────────────────
//!   Process::configure(name, setup?, teardown?, logger)
//!   Process::start(work) ───── spawn ──────► setup(token)?
//!        │                                      │ Err ─► ready=Err, done=Err(Setup) ─► end
//!        ◄──────────── ready Signal ◄────────── Ok  ─► ready=Ok
//!                                             work(token)
//!                                               │ Err ─► outcome=Err(Work)
//!   Process::stop(timeout)                      │ Ok(Finished | Cancelled)
//!     ├─ token.cancel() ─────────────────────►  ▼
//!     └─ wait done ≤ timeout                  teardown(token)?   (errors logged only)
//!        ◄──────────── done Signal ◄────────── done=outcome (exactly once)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Process**       | One supervised task with setup/teardown and stop deadline.   | [`Process`], [`ProcessBuilder`], [`Signal`] |
//! | **Work & hooks**  | Cancelable units as traits or closures.                      | [`Work`], [`WorkFn`], [`Hook`], [`HookFn`]  |
//! | **Groups**        | Shut down several processes with a grace period.             | [`ProcessGroup`], [`Config`]                |
//! | **Errors**        | Typed errors for hooks, processes and groups.                | [`TaskError`], [`ProcessError`], [`RuntimeError`] |
//! | **Logging**       | Injected leveled logger, `tracing`-backed or in-memory.      | [`Logger`], [`TracingLogger`], [`ObservedLogger`] |
//!
//! ## Optional features
//! - `logging`: exports [`init_logging`], a stdout `tracing-subscriber` setup.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use procvisor::{Completion, HookFn, ObservedLogger, Process, TaskError, WorkFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let log = ObservedLogger::new();
//!     let process = Process::builder("poller")
//!         .with_setup(HookFn::arc(|_ctx: CancellationToken| async { Ok::<_, TaskError>(()) }))
//!         .with_logger(log.handle())
//!         .build();
//!
//!     let ready = process.start(WorkFn::arc(|ctx: CancellationToken| async move {
//!         loop {
//!             tokio::select! {
//!                 _ = ctx.cancelled() => return Ok::<_, TaskError>(Completion::Cancelled),
//!                 _ = tokio::time::sleep(Duration::from_millis(10)) => { /* poll */ }
//!             }
//!         }
//!     }));
//!     ready.wait().await?;
//!
//!     process.stop(Duration::from_secs(1)).await?;
//!     assert!(process.done().is_resolved());
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod logging;
mod tasks;

// ---- Public re-exports ----

pub use crate::core::{Config, Outcome, Process, ProcessBuilder, ProcessGroup, Signal};
pub use error::{ProcessError, RuntimeError, TaskError};
pub use logging::{
    Level, LogEntry, Logger, LoggerRef, NopLogger, ObservedLogger, ParseLevelError, TracingLogger,
};
pub use tasks::{Completion, Hook, HookFn, HookRef, Work, WorkFn, WorkRef};

// Optional: stdout tracing subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use logging::init_logging;
