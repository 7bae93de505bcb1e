// tests/dispatcher_core.rs

mod common;
use crate::common::builders::{at, t0, DispatcherBuilder, RunPolicyBuilder};
use crate::common::{dir_event, file_event};

use std::path::PathBuf;
use std::time::Duration;

use when_changed::engine::{CoreCommand, DispatchPhase, RuntimeEvent, Verdict};
use when_changed::types::{EventKind, LogicalChange, START_SENTINEL};

fn notes_dispatcher() -> DispatcherBuilder {
    DispatcherBuilder::new()
        .with_file("/proj/notes.txt")
        .with_file("/proj/other.txt")
        .with_dir("/proj/src/deep")
        .watch("/proj/notes.txt")
}

#[test]
fn start_without_run_at_start_is_idle() {
    let mut core = notes_dispatcher().build();
    let step = core.start(t0());

    assert_eq!(step.verdict, Verdict::Idle);
    assert!(step.commands.is_empty());
    assert!(step.keep_running);
    assert_eq!(core.last_run_started(), None);
}

#[test]
fn run_at_start_uses_the_sentinel_path() {
    let mut core = notes_dispatcher()
        .policy(RunPolicyBuilder::new().run_at_start(true).build())
        .build();
    let step = core.start(t0());

    assert_eq!(step.verdict, Verdict::RunAtStart);
    assert_eq!(
        step.commands,
        vec![CoreCommand::RunCommand(LogicalChange {
            path: PathBuf::from(START_SENTINEL),
            kind: EventKind::Modified,
            timestamp: t0(),
        })]
    );
    assert_eq!(core.last_run_started(), Some(t0()));
    assert_eq!(core.phase(), DispatchPhase::RunningCommand);
}

#[test]
fn modification_of_target_fires() {
    let mut core = notes_dispatcher().build();
    let step = core.step(file_event("/proj/notes.txt", EventKind::Modified), at(10));

    assert_eq!(step.verdict, Verdict::Fired);
    assert_eq!(
        step.commands,
        vec![CoreCommand::RunCommand(LogicalChange {
            path: PathBuf::from("/proj/notes.txt"),
            kind: EventKind::Modified,
            timestamp: at(10),
        })]
    );
    assert_eq!(core.phase(), DispatchPhase::RunningCommand);

    core.command_finished();
    assert_eq!(core.phase(), DispatchPhase::Idle);
}

#[test]
fn sibling_of_file_target_is_not_interesting() {
    let mut core = notes_dispatcher().build();
    let step = core.step(file_event("/proj/other.txt", EventKind::Modified), at(10));
    assert_eq!(step.verdict, Verdict::NotInterested);
    assert!(step.commands.is_empty());
}

#[test]
fn directory_events_are_discarded() {
    let mut core = DispatcherBuilder::new()
        .with_dir("/proj/src/deep")
        .watch("/proj/src")
        .build();

    let step = core.step(dir_event("/proj/src/deep", EventKind::Created), at(10));
    assert_eq!(step.verdict, Verdict::Directory);
}

#[test]
fn exclusion_wins_over_interest() {
    let mut core = DispatcherBuilder::new()
        .with_dir("/proj/src")
        .watch("/proj/src")
        .build();

    for path in ["/proj/src/.main.c.swp", "/proj/src/4913", "/proj/src/main.c~"] {
        let step = core.step(file_event(path, EventKind::Modified), at(10));
        assert_eq!(step.verdict, Verdict::Excluded, "{path}");
    }
}

#[test]
fn folded_creation_is_dropped_and_the_following_modify_fires() {
    let mut core = DispatcherBuilder::new()
        .with_dir("/proj/src")
        .watch("/proj/src")
        .creation_folded(true)
        .build();

    let created = core.step(file_event("/proj/src/new.c", EventKind::Created), at(0));
    assert_eq!(created.verdict, Verdict::FoldedCreation);

    let modified = core.step(file_event("/proj/src/new.c", EventKind::Modified), at(1));
    assert_eq!(modified.verdict, Verdict::Fired);
}

#[test]
fn creation_fires_when_not_folded() {
    let mut core = DispatcherBuilder::new()
        .with_dir("/proj/src")
        .watch("/proj/src")
        .build();

    let step = core.step(file_event("/proj/src/new.c", EventKind::Created), at(0));
    assert_eq!(step.verdict, Verdict::Fired);
}

#[test]
fn repeat_events_are_debounced() {
    let mut core = notes_dispatcher().build();

    assert_eq!(
        core.step(file_event("/proj/notes.txt", EventKind::Modified), at(0)).verdict,
        Verdict::Fired
    );
    assert_eq!(
        core.step(file_event("/proj/notes.txt", EventKind::Modified), at(200)).verdict,
        Verdict::Debounced
    );
    assert_eq!(
        core.step(file_event("/proj/notes.txt", EventKind::Modified), at(800)).verdict,
        Verdict::Fired
    );
}

#[test]
fn run_once_skips_files_written_before_the_last_run() {
    let builder = DispatcherBuilder::new()
        .with_dir("/proj/src")
        .with_file("/proj/src/a.c")
        .with_file("/proj/src/b.c")
        .watch("/proj/src")
        .policy(RunPolicyBuilder::new().run_once(true).build());
    let fs = builder.fs();
    let mut core = builder.build();

    // First change: no previous run, fires.
    fs.touch("/proj/src/a.c", at(1_000));
    let first = core.step(file_event("/proj/src/a.c", EventKind::Modified), at(1_000));
    assert_eq!(first.verdict, Verdict::Fired);
    core.command_finished();

    // b.c still carries its old mtime: it was written before the run began.
    let stale = core.step(file_event("/proj/src/b.c", EventKind::Modified), at(1_100));
    assert_eq!(stale.verdict, Verdict::UnchangedSinceLastRun);

    // A fresh write after the run began fires.
    fs.touch("/proj/src/b.c", at(2_000));
    let fresh = core.step(file_event("/proj/src/b.c", EventKind::Modified), at(2_000));
    assert_eq!(fresh.verdict, Verdict::Fired);
}

#[test]
fn run_once_ignores_stat_failures() {
    let mut core = DispatcherBuilder::new()
        .with_dir("/proj/src")
        .with_file("/proj/src/a.c")
        .watch("/proj/src")
        .policy(RunPolicyBuilder::new().run_once(true).build())
        .build();

    assert_eq!(
        core.step(file_event("/proj/src/a.c", EventKind::Modified), at(1_000)).verdict,
        Verdict::Fired
    );
    // gone.c can't be stat'ed; the change still runs the command.
    assert_eq!(
        core.step(file_event("/proj/src/gone.c", EventKind::Deleted), at(1_100)).verdict,
        Verdict::Fired
    );
}

#[test]
fn deleting_a_watched_directory_is_fatal() {
    let builder = DispatcherBuilder::new()
        .with_file("/proj/src/main.c")
        .watch("/proj/src");
    let fs = builder.fs();
    let mut core = builder.build();

    fs.remove("/proj/src");
    let step = core.step(dir_event("/proj/src", EventKind::Deleted), at(10));

    assert_eq!(step.verdict, Verdict::TargetLost);
    assert_eq!(step.commands, vec![CoreCommand::TargetLost(PathBuf::from("/proj/src"))]);
    assert!(!step.keep_running);
}

#[test]
fn deleting_a_watched_file_runs_the_command() {
    let builder = notes_dispatcher();
    let fs = builder.fs();
    let mut core = builder.build();

    fs.remove("/proj/notes.txt");
    let step = core.step(file_event("/proj/notes.txt", EventKind::Deleted), at(10));
    assert_eq!(step.verdict, Verdict::Fired);
}

#[test]
fn kill_and_replace_never_enters_running_phase() {
    let mut core = notes_dispatcher()
        .policy(RunPolicyBuilder::new().kill_and_replace(true).build())
        .build();

    let step = core.step(file_event("/proj/notes.txt", EventKind::Modified), at(10));
    assert_eq!(step.verdict, Verdict::Fired);
    assert_eq!(core.phase(), DispatchPhase::Idle);
}

#[test]
fn recursive_policy_reaches_nested_files() {
    let mut flat = DispatcherBuilder::new()
        .with_dir("/proj/src/deep")
        .watch("/proj/src")
        .build();
    let mut deep = DispatcherBuilder::new()
        .with_dir("/proj/src/deep")
        .watch("/proj/src")
        .policy(RunPolicyBuilder::new().recursive(true).build())
        .build();

    let event = || file_event("/proj/src/deep/util.c", EventKind::Modified);
    assert_eq!(flat.step(event(), at(0)).verdict, Verdict::NotInterested);
    assert_eq!(deep.step(event(), at(0)).verdict, Verdict::Fired);
}

#[test]
fn shutdown_stops_the_loop() {
    let mut core = notes_dispatcher().build();
    let step = core.step(RuntimeEvent::ShutdownRequested, t0() + Duration::from_secs(1));

    assert_eq!(step.verdict, Verdict::Shutdown);
    assert!(step.commands.is_empty());
    assert!(!step.keep_running);
}
