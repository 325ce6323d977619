//! Runtime core: process lifecycle and group shutdown.
//!
//! The public API from this module is [`Process`] (with [`ProcessBuilder`]),
//! the [`Signal`] it reports through, and [`ProcessGroup`] with its [`Config`].
//!
//! Internal modules:
//! - [`lifecycle`]: the background body (setup → work → teardown);
//! - [`signal`]: single-assignment ready/done cells;
//! - [`process`]: start/stop/done handle around one lifecycle;
//! - [`group`]: shared shutdown with a grace period;
//! - [`shutdown`]: cross-platform OS signal handling.

mod builder;
mod config;
mod group;
mod lifecycle;
mod process;
mod shutdown;
mod signal;

pub use builder::ProcessBuilder;
pub use config::Config;
pub use group::ProcessGroup;
pub use process::Process;
pub use signal::{Outcome, Signal};
