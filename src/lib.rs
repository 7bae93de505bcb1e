// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod report;
pub mod types;
pub mod watch;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::Settings;
use crate::engine::{CoreDispatcher, Runtime, RuntimeEvent};
use crate::errors::Result;
use crate::exec::CommandRunner;
use crate::fs::{FileSystem, RealFileSystem};
use crate::report::Reporter;
use crate::watch::{ExclusionFilter, PathIndex, CREATION_FOLDED};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - target resolution
/// - the dispatcher core and its runtime shell
/// - the command runner
/// - the file watcher
/// - Ctrl-C handling
pub async fn run(settings: Settings) -> Result<()> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let index = PathIndex::resolve(fs.as_ref(), settings.targets.as_slice())?;
    let exclusions = ExclusionFilter::new()?;
    let policy = settings.policy;

    if policy.verbosity > 0 {
        println!("{}", settings.describe());
    }
    debug!(?policy, targets = index.len(), "resolved watch targets");

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    // Kept alive until the runtime returns.
    let watcher = crate::watch::spawn_watcher(&index, policy.recursive, fs.clone(), rt_tx.clone())?;
    info!(roots = ?watcher.roots(), "file watcher running");

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }
    drop(rt_tx);

    let core = CoreDispatcher::new(index, exclusions, policy, fs)
        .with_creation_folded(CREATION_FOLDED);
    let executor = CommandRunner::new(settings.command.clone(), policy.kill_and_replace);
    let reporter = Reporter::new(policy.verbosity, &settings.command);

    let result = Runtime::new(core, rt_rx, executor)
        .with_reporter(reporter)
        .run()
        .await;

    drop(watcher);
    result
}
