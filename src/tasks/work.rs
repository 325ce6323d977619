//! # Work abstraction and function-backed work implementation.
//!
//! [`Work`] is the main body of a supervised process. It receives the process
//! [`CancellationToken`] and runs until it finishes or observes cancellation.
//! [`WorkFn`] wraps a closure producing a fresh future per call; the shared
//! handle type is [`WorkRef`].
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use procvisor::{Completion, TaskError, WorkFn, WorkRef};
//!
//! let ticker: WorkRef = WorkFn::arc(|ctx: CancellationToken| async move {
//!     loop {
//!         tokio::select! {
//!             _ = ctx.cancelled() => return Ok::<_, TaskError>(Completion::Cancelled),
//!             _ = tokio::time::sleep(Duration::from_millis(10)) => {}
//!         }
//!     }
//! });
//! # let _ = ticker;
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// How a work function returned without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The work ran to its natural end.
    Finished,
    /// The work observed cancellation and returned early.
    Cancelled,
}

impl Completion {
    /// Returns `true` for [`Completion::Finished`].
    #[inline]
    pub fn is_finished(self) -> bool {
        matches!(self, Completion::Finished)
    }
}

/// # Asynchronous, cancelable unit of work.
///
/// Cancellation is cooperative: implementors must check `ctx.is_cancelled()`
/// or await `ctx.cancelled()` and return [`Completion::Cancelled`] promptly.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use procvisor::{Completion, TaskError, Work};
///
/// struct Once;
///
/// #[async_trait]
/// impl Work for Once {
///     async fn run(&self, ctx: CancellationToken) -> Result<Completion, TaskError> {
///         if ctx.is_cancelled() {
///             return Ok(Completion::Cancelled);
///         }
///         Ok(Completion::Finished)
///     }
/// }
/// ```
#[async_trait]
pub trait Work: Send + Sync + 'static {
    /// Executes the work until completion or cancellation.
    async fn run(&self, ctx: CancellationToken) -> Result<Completion, TaskError>;
}

/// Shared handle to a work implementation.
pub type WorkRef = Arc<dyn Work>;

/// Function-backed work.
///
/// Each call to [`Work::run`] invokes the closure and awaits the returned future,
/// so no state is shared between calls unless the closure captures an `Arc`.
#[derive(Debug)]
pub struct WorkFn<F> {
    f: F,
}

impl<F> WorkFn<F> {
    /// Wraps a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Wraps a closure and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Work for WorkFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Completion, TaskError>> + Send + 'static,
{
    async fn run(&self, ctx: CancellationToken) -> Result<Completion, TaskError> {
        (self.f)(ctx).await
    }
}
