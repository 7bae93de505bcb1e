// src/engine/event_handlers.rs

//! Event handling logic for the core dispatcher.

use std::path::PathBuf;
use std::time::SystemTime;

use tracing::debug;

use crate::config::RunPolicy;
use crate::engine::debounce::Debouncer;
use crate::errors::WhenChangedError;
use crate::fs::FileSystem;
use crate::types::{EventKind, LogicalChange, RawEvent};
use crate::watch::{ExclusionFilter, PathIndex};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Run the command for this change.
    RunCommand(LogicalChange),
    /// A watched directory vanished; the shell must clean up and fail.
    TargetLost(PathBuf),
}

/// What the core decided about one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Startup without `--run-at-start`.
    Idle,
    /// The synthetic startup run.
    RunAtStart,
    /// Directory events never run the command.
    Directory,
    Excluded,
    NotInterested,
    /// `Created` from a source that reports a modification right after.
    FoldedCreation,
    Debounced,
    /// `--run-once`: the file predates the last run.
    UnchangedSinceLastRun,
    Fired,
    TargetLost,
    Shutdown,
}

/// Decision returned by the core after handling a single input.
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub verdict: Verdict,
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn discard(verdict: Verdict) -> Self {
        Self {
            verdict,
            commands: Vec::new(),
            keep_running: true,
        }
    }
}

/// Whether a command started by the dispatcher is still being waited on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchPhase {
    #[default]
    Idle,
    RunningCommand,
}

/// Mutable dispatcher state.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    pub debouncer: Debouncer,
    pub last_run_started: Option<SystemTime>,
    pub phase: DispatchPhase,
}

impl RunState {
    fn record_run(&mut self, policy: &RunPolicy, now: SystemTime) {
        self.last_run_started = Some(now);
        if !policy.kill_and_replace {
            self.phase = DispatchPhase::RunningCommand;
        }
    }
}

/// Read-only collaborators the handlers consult.
#[derive(Debug, Clone, Copy)]
pub struct DispatchContext<'a> {
    pub index: &'a PathIndex,
    pub exclusions: &'a ExclusionFilter,
    pub policy: &'a RunPolicy,
    pub fs: &'a dyn FileSystem,
    pub creation_folded: bool,
}

/// Handle entry into the run loop.
pub fn handle_start(policy: &RunPolicy, state: &mut RunState, now: SystemTime) -> CoreStep {
    if !policy.run_at_start {
        return CoreStep::discard(Verdict::Idle);
    }

    state.record_run(policy, now);
    CoreStep {
        verdict: Verdict::RunAtStart,
        commands: vec![CoreCommand::RunCommand(LogicalChange::at_start(now))],
        keep_running: true,
    }
}

/// Handle one raw filesystem event.
///
/// Filters are applied in a fixed order: lost target, directory, exclusion,
/// interest, folded creation, debounce, run-once.
pub fn handle_file_change(
    ctx: &DispatchContext<'_>,
    state: &mut RunState,
    event: RawEvent,
    now: SystemTime,
) -> CoreStep {
    let RawEvent {
        path,
        kind,
        is_directory,
    } = event;

    if kind == EventKind::Deleted && target_lost(ctx, &path) {
        return CoreStep {
            verdict: Verdict::TargetLost,
            commands: vec![CoreCommand::TargetLost(path)],
            keep_running: false,
        };
    }

    if is_directory {
        return CoreStep::discard(Verdict::Directory);
    }

    if ctx.exclusions.is_excluded(&path) {
        return CoreStep::discard(Verdict::Excluded);
    }

    if !ctx.index.is_interested(&path, ctx.policy.recursive) {
        return CoreStep::discard(Verdict::NotInterested);
    }

    if kind == EventKind::Created && ctx.creation_folded {
        return CoreStep::discard(Verdict::FoldedCreation);
    }

    if !state.debouncer.should_fire(&path, kind, now) {
        return CoreStep::discard(Verdict::Debounced);
    }

    if ctx.policy.run_once && unchanged_since_last_run(ctx, state, &path) {
        return CoreStep::discard(Verdict::UnchangedSinceLastRun);
    }

    state.record_run(ctx.policy, now);
    CoreStep {
        verdict: Verdict::Fired,
        commands: vec![CoreCommand::RunCommand(LogicalChange {
            path,
            kind,
            timestamp: now,
        })],
        keep_running: true,
    }
}

/// A directory target was deleted and cannot be resolved again.
fn target_lost(ctx: &DispatchContext<'_>, path: &std::path::Path) -> bool {
    match ctx.index.get(path) {
        Some(target) if target.is_dir() => ctx.fs.canonicalize(path).is_err(),
        _ => false,
    }
}

/// `--run-once` check: was the file last written before the last run began?
///
/// A file that can't be stat'ed (typically mid-save) doesn't suppress.
fn unchanged_since_last_run(
    ctx: &DispatchContext<'_>,
    state: &RunState,
    path: &std::path::Path,
) -> bool {
    let Some(last_run) = state.last_run_started else {
        return false;
    };

    match ctx.fs.modified(path) {
        Ok(mtime) => mtime < last_run,
        Err(err) => {
            let err = WhenChangedError::StatFailure {
                path: path.to_path_buf(),
                reason: format!("{err:#}"),
            };
            debug!(error = %err, "ignoring stat failure");
            false
        }
    }
}
