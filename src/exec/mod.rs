// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the user's command,
//! using `tokio::process::Command`.
//!
//! - [`backend`] provides the `ExecutorBackend` trait the runtime talks to,
//!   which tests can replace with a fake implementation.
//! - [`runner`] is the production backend: placeholder substitution, the
//!   child environment, and kill-and-replace bookkeeping.
//! - [`signal`] wraps the platform calls used to terminate commands.

pub mod backend;
pub mod runner;
pub mod signal;

pub use backend::{ExecutorBackend, RunOutcome};
pub use runner::{
    child_environment, substitute_path, CommandRunner, EVENT_ENV_VAR, FILE_ENV_VAR, KILL_GRACE,
    PATH_PLACEHOLDER,
};
