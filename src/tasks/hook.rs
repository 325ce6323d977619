//! # Setup and teardown hooks.
//!
//! A [`Hook`] runs once around the work function: setup before it, teardown
//! after it. Both receive the process [`CancellationToken`]; teardown gets it
//! even when it is already cancelled.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// One-shot lifecycle hook.
#[async_trait]
pub trait Hook: Send + Sync + 'static {
    /// Runs the hook with the process token.
    async fn call(&self, ctx: CancellationToken) -> Result<(), TaskError>;
}

/// Shared handle to a hook.
pub type HookRef = Arc<dyn Hook>;

/// Function-backed hook.
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use procvisor::{HookFn, HookRef, TaskError};
///
/// let setup: HookRef = HookFn::arc(|_ctx: CancellationToken| async {
///     Ok::<_, TaskError>(())
/// });
/// # let _ = setup;
/// ```
#[derive(Debug)]
pub struct HookFn<F> {
    f: F,
}

impl<F> HookFn<F> {
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
impl<F, Fut> Hook for HookFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    async fn call(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        (self.f)(ctx).await
    }
}
