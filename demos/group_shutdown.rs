//! # Example: group_shutdown
//!
//! Several processes sharing one root token, shut down within a grace period.
//!
//! One worker ignores cancellation, so shutdown reports it as stuck instead of
//! waiting for it forever.
//!
//! ## Flow
//! ```text
//! ProcessGroup::new(Config { grace: 500ms })
//!     ├─► builder("fast").build().start(..)
//!     ├─► builder("slow").build().start(..)     (ignores the token)
//!     └─► shutdown()
//!          ├─► root token.cancel()
//!          ├─► fast: done = Ok
//!          └─► slow: deadline passes ──► GraceExceeded { stuck: ["slow"] }
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example group_shutdown
//! ```

use std::time::Duration;

use procvisor::{Completion, Config, ProcessGroup, RuntimeError, TaskError, TracingLogger, WorkFn};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Group with a short grace period
    let cfg = Config {
        grace: Duration::from_millis(500),
    };
    let mut group = ProcessGroup::new(cfg, TracingLogger::new().arc());

    // 2. A well-behaved worker
    let fast = group.builder("fast").build();
    fast.start(WorkFn::arc(|ctx: CancellationToken| async move {
        ctx.cancelled().await;
        println!("[fast] cancelled");
        Ok::<_, TaskError>(Completion::Cancelled)
    }))
    .wait()
    .await?;
    group.push(fast);

    // 3. A worker that never looks at its token
    let slow = group.builder("slow").build();
    slow.start(WorkFn::arc(|_ctx: CancellationToken| async {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok::<_, TaskError>(Completion::Finished)
    }))
    .wait()
    .await?;
    group.push(slow);

    // 4. Shut everything down
    match group.shutdown().await {
        Ok(()) => println!("all stopped"),
        Err(RuntimeError::GraceExceeded { stuck, .. }) => println!("stuck: {stuck:?}"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
