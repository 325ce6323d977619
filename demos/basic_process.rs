//! # Example: basic_process
//!
//! One process with setup and teardown hooks, stopped from the outside.
//!
//! Demonstrates how to:
//! - Build a [`Process`] with [`HookFn`] setup/teardown.
//! - Wait for the ready signal before relying on the work.
//! - Stop it with a deadline and read the done signal.
//!
//! ## Flow
//! ```text
//! Process::builder("poller")
//!     ├─► start(work) ──► setup ──► ready = Ok
//!     │                   work ticks until the token fires
//!     ├─► stop(1s)    ──► token.cancel()
//!     │                   teardown
//!     └─► done = Ok
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic_process
//! ```

use std::time::Duration;

use procvisor::{Completion, HookFn, Process, TaskError, TracingLogger, WorkFn};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Hooks: setup runs before work, teardown after it
    let setup = HookFn::arc(|_ctx: CancellationToken| async {
        println!("[poller] connecting");
        Ok::<_, TaskError>(())
    });
    let teardown = HookFn::arc(|ctx: CancellationToken| async move {
        println!("[poller] closing (cancelled={})", ctx.is_cancelled());
        Ok::<_, TaskError>(())
    });

    // 2. Configure the process
    let process = Process::builder("poller")
        .with_setup(setup)
        .with_teardown(teardown)
        .with_logger(TracingLogger::new().arc())
        .build();

    // 3. Start work that polls until cancelled
    let work = WorkFn::arc(|ctx: CancellationToken| async move {
        let mut tick = 0u32;
        loop {
            tokio::select! {
                _ = ctx.cancelled() => return Ok::<_, TaskError>(Completion::Cancelled),
                _ = tokio::time::sleep(Duration::from_millis(200)) => {
                    tick += 1;
                    println!("[poller] tick {tick}");
                }
            }
        }
    });
    process.start(work).wait().await?;

    // 4. Let it run, then stop with a deadline
    tokio::time::sleep(Duration::from_millis(700)).await;
    process.stop(Duration::from_secs(1)).await?;

    println!("[poller] done: {:?}", process.done().try_get());
    Ok(())
}
