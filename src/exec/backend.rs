// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of spawning processes
//! itself. This makes it easy to swap in a fake executor in tests while
//! keeping the production implementation in [`runner`](super::runner).

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::types::LogicalChange;

use super::runner::CommandRunner;

/// What happened to one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The command ran to completion (`None` when killed by a signal).
    Exited(Option<i32>),
    /// Kill-and-replace: the command was started and left running.
    Spawned { pid: Option<u32> },
}

/// Trait abstracting how a change is turned into a running command.
///
/// Production code uses [`CommandRunner`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait ExecutorBackend: Send {
    /// Run the command for `change`.
    ///
    /// Resolves when the command exited, or, under kill-and-replace, as soon
    /// as it was started.
    fn run(
        &mut self,
        change: LogicalChange,
    ) -> Pin<Box<dyn Future<Output = Result<RunOutcome>> + Send + '_>>;

    /// Terminate anything still running. Errors are ignored.
    fn shutdown(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

impl ExecutorBackend for CommandRunner {
    fn run(
        &mut self,
        change: LogicalChange,
    ) -> Pin<Box<dyn Future<Output = Result<RunOutcome>> + Send + '_>> {
        Box::pin(async move { CommandRunner::run(self, &change).await })
    }

    fn shutdown(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(CommandRunner::shutdown(self))
    }
}
