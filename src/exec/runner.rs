// src/exec/runner.rs

//! Command process runner.
//!
//! On unix every invocation leads its own process group, so terminating the
//! group also reaches whatever the command started in the background. The
//! group is detached from the terminal's foreground group, which is why
//! children get a null stdin; their stdout and stderr are inherited.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::errors::{Result, WhenChangedError};
use crate::exec::signal;
use crate::types::LogicalChange;

/// Placeholder replaced by the changed path in every command token.
pub const PATH_PLACEHOLDER: &str = "%f";

pub const EVENT_ENV_VAR: &str = "WHEN_CHANGED_EVENT";
pub const FILE_ENV_VAR: &str = "WHEN_CHANGED_FILE";

/// How long a terminated command gets between SIGTERM and a hard kill.
pub const KILL_GRACE: Duration = Duration::from_secs(5);

/// Runs the user's command template, either waiting for each invocation
/// or, under kill-and-replace, keeping at most one invocation alive.
#[derive(Debug)]
pub struct CommandRunner {
    template: Vec<String>,
    kill_and_replace: bool,
    /// The latest invocation. Owned here rather than by the `run` future so
    /// that an abandoned wait still leaves it reachable for `shutdown`.
    current: Option<Child>,
    /// Process groups led by our children that may still have members.
    groups: Vec<u32>,
}

impl CommandRunner {
    pub fn new(template: Vec<String>, kill_and_replace: bool) -> Self {
        Self {
            template,
            kill_and_replace,
            current: None,
            groups: Vec::new(),
        }
    }

    /// Process groups this runner may still have to clean up at shutdown.
    pub fn tracked_pids(&self) -> Vec<u32> {
        self.groups.clone()
    }

    /// Run the command for `change`.
    ///
    /// In kill-and-replace mode the previous invocation's process group is
    /// terminated first and the new child is left running.
    pub async fn run(&mut self, change: &LogicalChange) -> Result<super::RunOutcome> {
        self.stop_current().await;
        self.prune_finished_groups();

        let path = change.path_str();
        let argv = substitute_path(&self.template, &path);
        let Some((program, args)) = argv.split_first() else {
            return Err(WhenChangedError::ArgumentError(
                "no command to run".to_string(),
            ));
        };
        let command_line = argv.join(" ");

        let mut cmd = build_command(program, args);
        cmd.env_clear()
            .envs(child_environment(change))
            .kill_on_drop(true);

        #[cfg(unix)]
        {
            cmd.process_group(0).stdin(std::process::Stdio::null());
        }

        info!(
            cmd = %command_line,
            path = %path,
            event = change.kind.env_value(),
            "starting command"
        );

        let child = cmd.spawn().map_err(|source| WhenChangedError::SpawnFailure {
            command: command_line.clone(),
            source,
        })?;

        let pid = child.id();
        if let Some(pid) = pid {
            self.groups.push(pid);
        }

        let child = self.current.insert(child);
        if self.kill_and_replace {
            return Ok(super::RunOutcome::Spawned { pid });
        }

        let status = child.wait().await;
        self.current = None;
        self.prune_finished_groups();

        let status = status.map_err(|source| WhenChangedError::WaitFailure {
            command: command_line.clone(),
            source,
        })?;

        info!(
            cmd = %command_line,
            exit_code = ?status.code(),
            success = status.success(),
            "command exited"
        );
        Ok(super::RunOutcome::Exited(status.code()))
    }

    /// Terminate the running invocation (if any) and every process group
    /// still tracked. Errors are logged and otherwise ignored.
    pub async fn shutdown(&mut self) {
        self.stop_current().await;
        self.prune_finished_groups();

        for pgid in self.groups.drain(..) {
            if let Err(err) = signal::terminate_group(pgid) {
                debug!(pgid, error = %err, "ignoring termination failure");
            }
        }
    }

    async fn stop_current(&mut self) {
        let Some(mut child) = self.current.take() else {
            return;
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                debug!(exit_code = ?status.code(), "previous command already exited");
                return;
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "failed to poll previous command"),
        }

        let Some(pid) = child.id() else {
            return;
        };

        info!(pid, "terminating running command");
        if let Err(err) = signal::terminate_group(pid) {
            debug!(pid, error = %err, "group termination failed; killing child");
            if let Err(err) = child.start_kill() {
                warn!(pid, error = %err, "failed to kill running command");
            }
        }

        match tokio::time::timeout(KILL_GRACE, child.wait()).await {
            Ok(Ok(status)) => debug!(pid, exit_code = ?status.code(), "command stopped"),
            Ok(Err(err)) => warn!(pid, error = %err, "failed to wait for command"),
            Err(_) => {
                warn!(pid, "command ignored SIGTERM; killing it");
                if let Err(err) = child.kill().await {
                    warn!(pid, error = %err, "failed to kill command");
                }
            }
        }
    }

    /// Forget groups whose last member is gone.
    fn prune_finished_groups(&mut self) {
        self.groups.retain(|&pgid| signal::group_alive(pgid));
    }
}

/// Replace every occurrence of `%f` in every token with `path`.
pub fn substitute_path(template: &[String], path: &str) -> Vec<String> {
    template
        .iter()
        .map(|token| token.replace(PATH_PLACEHOLDER, path))
        .collect()
}

/// Environment for one invocation: a fresh copy of ours plus the two
/// when-changed variables.
pub fn child_environment(change: &LogicalChange) -> BTreeMap<OsString, OsString> {
    let mut env: BTreeMap<OsString, OsString> = std::env::vars_os().collect();
    env.insert(
        EVENT_ENV_VAR.into(),
        change.kind.env_value().into(),
    );
    env.insert(FILE_ENV_VAR.into(), change.path.clone().into_os_string());
    env
}

/// A single token is handed to the platform shell; anything longer is
/// executed directly.
fn build_command(program: &str, args: &[String]) -> Command {
    if !args.is_empty() {
        let mut c = Command::new(program);
        c.args(args);
        return c;
    }

    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(program);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(program);
        c
    }
}
