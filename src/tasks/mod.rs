//! # Hooks and work functions.
//!
//! This module provides the units a [`Process`](crate::Process) executes:
//! - [`Work`] - trait for the cancelable main body, with [`Completion`]
//! - [`WorkFn`] / [`WorkRef`] - function-backed work and its shared handle
//! - [`Hook`] - trait for setup/teardown hooks
//! - [`HookFn`] / [`HookRef`] - function-backed hook and its shared handle

mod hook;
mod work;

pub use hook::{Hook, HookFn, HookRef};
pub use work::{Completion, Work, WorkFn, WorkRef};
