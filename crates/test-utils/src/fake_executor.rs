use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use when_changed::engine::RuntimeEvent;
use when_changed::errors::{Result, WhenChangedError};
use when_changed::exec::{ExecutorBackend, RunOutcome};
use when_changed::types::LogicalChange;

/// A fake executor that:
/// - records every change it was asked to run
/// - optionally takes a while per run, or fails to spawn
/// - optionally pushes scripted events into the runtime while "running".
pub struct FakeExecutor {
    executed: Arc<Mutex<Vec<LogicalChange>>>,
    shutdowns: Arc<Mutex<usize>>,
    run_time: Duration,
    fail_spawn: bool,
    during_first_run: Vec<RuntimeEvent>,
    runtime_tx: Option<mpsc::Sender<RuntimeEvent>>,
}

impl FakeExecutor {
    pub fn new(executed: Arc<Mutex<Vec<LogicalChange>>>) -> Self {
        Self {
            executed,
            shutdowns: Arc::new(Mutex::new(0)),
            run_time: Duration::ZERO,
            fail_spawn: false,
            during_first_run: Vec::new(),
            runtime_tx: None,
        }
    }

    /// Each run sleeps this long before "exiting".
    pub fn with_run_time(mut self, run_time: Duration) -> Self {
        self.run_time = run_time;
        self
    }

    /// Every run fails with `SpawnFailure`.
    pub fn failing(mut self) -> Self {
        self.fail_spawn = true;
        self
    }

    /// Send `events` to the runtime while the first run is in progress. The
    /// sender is dropped once that run completes.
    pub fn with_events_during_first_run(
        mut self,
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        events: Vec<RuntimeEvent>,
    ) -> Self {
        self.runtime_tx = Some(runtime_tx);
        self.during_first_run = events;
        self
    }

    /// Shared counter of `shutdown` calls.
    pub fn shutdown_counter(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.shutdowns)
    }
}

impl ExecutorBackend for FakeExecutor {
    fn run(
        &mut self,
        change: LogicalChange,
    ) -> Pin<Box<dyn Future<Output = Result<RunOutcome>> + Send + '_>> {
        let executed = Arc::clone(&self.executed);
        let scripted = std::mem::take(&mut self.during_first_run);
        let tx = self.runtime_tx.take();
        let run_time = self.run_time;
        let fail_spawn = self.fail_spawn;

        Box::pin(async move {
            executed.lock().unwrap().push(change);

            if fail_spawn {
                return Err(WhenChangedError::SpawnFailure {
                    command: "fake".to_string(),
                    source: io::Error::new(io::ErrorKind::NotFound, "no such program"),
                });
            }

            if let Some(tx) = tx {
                for event in scripted {
                    tx.send(event).await.map_err(anyhow::Error::from)?;
                }
            }

            tokio::time::sleep(run_time).await;
            Ok(RunOutcome::Exited(Some(0)))
        })
    }

    fn shutdown(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        let shutdowns = Arc::clone(&self.shutdowns);
        Box::pin(async move {
            *shutdowns.lock().unwrap() += 1;
        })
    }
}
