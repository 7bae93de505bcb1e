// src/engine/runtime.rs

use std::collections::VecDeque;
use std::fmt;
use std::time::SystemTime;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::{Result, WhenChangedError};
use crate::exec::{ExecutorBackend, RunOutcome};
use crate::report::Reporter;
use crate::types::{LogicalChange, RawEvent};

use super::core::CoreDispatcher;
use super::{CoreCommand, RuntimeEvent};

/// Drives the dispatcher in response to `RuntimeEvent`s, and delegates
/// actual command execution to an `ExecutorBackend`.
///
/// This is a pure IO shell around `CoreDispatcher`, which contains all the
/// filtering semantics. This struct handles async IO: reading events from
/// channels, running the command, and shutting down.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreDispatcher,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
    reporter: Reporter,
    /// File events that arrived while a command was being waited on, with
    /// their arrival time.
    backlog: VecDeque<(RawEvent, SystemTime)>,
    channel_open: bool,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("backlog", &self.backlog.len())
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(
        core: CoreDispatcher,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        executor: E,
    ) -> Self {
        Self {
            core,
            event_rx,
            executor,
            reporter: Reporter::silent(),
            backlog: VecDeque::new(),
            channel_open: true,
        }
    }

    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Main event loop.
    ///
    /// - Performs the run-at-start invocation if requested.
    /// - Consumes `RuntimeEvent`s, buffered ones first.
    /// - Executes commands returned by the core.
    ///
    /// Returns `Ok(())` on requested shutdown or when every event source is
    /// gone, and `Err(WatchLost)` when a watched directory disappeared.
    /// The executor is always shut down before returning.
    pub async fn run(mut self) -> Result<()> {
        info!("when-changed runtime started");

        let result = self.event_loop().await;
        self.executor.shutdown().await;

        info!("runtime exiting");
        result
    }

    async fn event_loop(&mut self) -> Result<()> {
        let step = self.core.start(SystemTime::now());
        for command in step.commands {
            if !self.execute_command(command).await? {
                return Ok(());
            }
        }

        loop {
            let (event, arrived) = match self.next_event().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    return Ok(());
                }
            };

            debug!(?event, "runtime received event");

            // Debounce against arrival, not against when the loop got to it.
            let step = self.core.step(event, arrived);

            for command in step.commands {
                if !self.execute_command(command).await? {
                    return Ok(());
                }
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                return Ok(());
            }
        }
    }

    async fn next_event(&mut self) -> Option<(RuntimeEvent, SystemTime)> {
        if let Some((raw, arrived)) = self.backlog.pop_front() {
            return Some((RuntimeEvent::FileChanged(raw), arrived));
        }
        if !self.channel_open {
            return None;
        }
        let event = self.event_rx.recv().await?;
        Some((event, SystemTime::now()))
    }

    /// Execute a single command from the core. Returns `false` when a
    /// shutdown arrived while the command was running.
    async fn execute_command(&mut self, command: CoreCommand) -> Result<bool> {
        match command {
            CoreCommand::RunCommand(change) => self.run_command(change).await,
            CoreCommand::TargetLost(path) => {
                warn!(path = ?path, "watched directory disappeared");
                Err(WhenChangedError::WatchLost(path))
            }
        }
    }

    async fn run_command(&mut self, change: LogicalChange) -> Result<bool> {
        self.reporter.announce(&change);

        let outcome = {
            let mut run = self.executor.run(change);

            loop {
                if !self.channel_open {
                    break (&mut run).await;
                }
                tokio::select! {
                    outcome = &mut run => break outcome,
                    event = self.event_rx.recv() => match event {
                        Some(RuntimeEvent::FileChanged(raw)) => {
                            self.backlog.push_back((raw, SystemTime::now()));
                        }
                        Some(RuntimeEvent::ShutdownRequested) => {
                            info!("shutdown requested while command was running");
                            return Ok(false);
                        }
                        None => self.channel_open = false,
                    },
                }
            }
        };

        self.core.command_finished();

        match outcome {
            Ok(RunOutcome::Exited(code)) => debug!(?code, "command finished"),
            Ok(RunOutcome::Spawned { pid }) => debug!(?pid, "command started"),
            Err(err) if err.is_recoverable() => warn!(error = %err, "command failed to run"),
            Err(err) => return Err(err),
        }
        Ok(true)
    }
}
