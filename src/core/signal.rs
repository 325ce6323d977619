//! # Single-assignment outcome cells.
//!
//! A process reports through two independent cells: **ready** (outcome of the
//! setup phase) and **done** (terminal outcome of the whole lifecycle). Each
//! cell is a `watch` channel holding `Option<Outcome>` with exactly one
//! writer.
//!
//! ```text
//!   background task                          callers
//!   ───────────────                          ───────
//!   Resolver::resolve(self, outcome) ──► Signal::wait()   (any number of clones)
//!            │                           Signal::try_get()
//!            └─ dropped unresolved  ───► wait() → Err(Aborted)
//! ```
//!
//! ## Rules
//! - [`Resolver::resolve`] consumes the resolver: resolving twice does not compile.
//! - Once resolved, every `wait` returns the same outcome immediately.
//! - A resolver dropped without a value (panic unwinding through the task)
//!   closes the cell; observers get [`ProcessError::Aborted`] instead of hanging.

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::ProcessError;

/// Outcome stored in a [`Signal`].
pub type Outcome = Result<(), ProcessError>;

/// Creates a connected resolver/signal pair for the process `name`.
pub(crate) fn pair(name: Arc<str>) -> (Resolver, Signal) {
    let (tx, rx) = watch::channel(None);
    (Resolver { tx }, Signal { name, rx })
}

/// The unique writer of a [`Signal`].
#[derive(Debug)]
pub(crate) struct Resolver {
    tx: watch::Sender<Option<Outcome>>,
}

impl Resolver {
    /// Stores `outcome` and wakes every waiter.
    pub(crate) fn resolve(self, outcome: Outcome) {
        self.tx.send_replace(Some(outcome));
    }
}

/// Observer of a single-assignment outcome cell.
///
/// Cheap to clone; all clones observe the same cell.
#[derive(Debug, Clone)]
pub struct Signal {
    name: Arc<str>,
    rx: watch::Receiver<Option<Outcome>>,
}

impl Signal {
    /// Creates a signal that is already resolved with `outcome`.
    pub fn resolved(name: impl Into<Arc<str>>, outcome: Outcome) -> Self {
        let (resolver, signal) = pair(name.into());
        resolver.resolve(outcome);
        signal
    }

    /// Waits until the cell is resolved and returns its outcome.
    ///
    /// Returns [`ProcessError::Aborted`] if the writer went away without resolving.
    pub async fn wait(&self) -> Outcome {
        let mut rx = self.rx.clone();
        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(value) => value.clone(),
            Err(_closed) => None,
        };
        outcome.unwrap_or_else(|| Err(self.aborted()))
    }

    /// Returns the outcome if already available, without waiting.
    pub fn try_get(&self) -> Option<Outcome> {
        if let Some(outcome) = self.rx.borrow().clone() {
            return Some(outcome);
        }
        if self.rx.has_changed().is_err() {
            return Some(Err(self.aborted()));
        }
        None
    }

    /// Whether [`Signal::wait`] would return immediately.
    pub fn is_resolved(&self) -> bool {
        self.try_get().is_some()
    }

    /// Name of the process this signal belongs to.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn aborted(&self) -> ProcessError {
        ProcessError::Aborted {
            name: Arc::clone(&self.name),
        }
    }
}
