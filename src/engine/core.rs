// src/engine/core.rs

//! Pure core dispatcher state machine.
//!
//! This module contains a synchronous, deterministic "core" that consumes
//! [`RuntimeEvent`]s and produces:
//! - an updated [`RunState`]
//! - a list of commands describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - running commands through an [`ExecutorBackend`](crate::exec::ExecutorBackend)
//! - handling Ctrl+C / shutdown
//!
//! The core is intended to be extensively tested without any Tokio,
//! channels, or processes. Time is always passed in.

use std::sync::Arc;
use std::time::SystemTime;

use tracing::debug;

use crate::config::RunPolicy;
use crate::engine::event_handlers::{
    handle_file_change, handle_start, CoreStep, DispatchContext, DispatchPhase, RunState, Verdict,
};
use crate::engine::RuntimeEvent;
use crate::fs::FileSystem;
use crate::watch::{ExclusionFilter, PathIndex};

#[derive(Debug)]
pub struct CoreDispatcher {
    index: PathIndex,
    exclusions: ExclusionFilter,
    policy: RunPolicy,
    fs: Arc<dyn FileSystem>,
    creation_folded: bool,
    state: RunState,
}

impl CoreDispatcher {
    pub fn new(
        index: PathIndex,
        exclusions: ExclusionFilter,
        policy: RunPolicy,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            index,
            exclusions,
            policy,
            fs,
            creation_folded: false,
            state: RunState::default(),
        }
    }

    /// Declare whether the event source reports `Created` only as a prelude
    /// to a modification (see [`crate::watch::CREATION_FOLDED`]).
    pub fn with_creation_folded(mut self, folded: bool) -> Self {
        self.creation_folded = folded;
        self
    }

    pub fn phase(&self) -> DispatchPhase {
        self.state.phase
    }

    pub fn last_run_started(&self) -> Option<SystemTime> {
        self.state.last_run_started
    }

    /// Called once when the run loop starts, before any event.
    pub fn start(&mut self, now: SystemTime) -> CoreStep {
        let step = handle_start(&self.policy, &mut self.state, now);
        debug!(verdict = ?step.verdict, "dispatcher started");
        step
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent, now: SystemTime) -> CoreStep {
        match event {
            RuntimeEvent::FileChanged(raw) => {
                let ctx = DispatchContext {
                    index: &self.index,
                    exclusions: &self.exclusions,
                    policy: &self.policy,
                    fs: self.fs.as_ref(),
                    creation_folded: self.creation_folded,
                };
                let path = raw.path.clone();
                let kind = raw.kind;
                let step = handle_file_change(&ctx, &mut self.state, raw, now);
                debug!(path = ?path, ?kind, verdict = ?step.verdict, "handled file event");
                step
            }
            RuntimeEvent::ShutdownRequested => CoreStep {
                verdict: Verdict::Shutdown,
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }

    /// The shell finished waiting for a command it was told to run.
    pub fn command_finished(&mut self) {
        self.state.phase = DispatchPhase::Idle;
    }
}
