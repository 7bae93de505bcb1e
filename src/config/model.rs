// src/config/model.rs

use crate::cli::LogLevel;

/// Highest meaningful `-v` count.
pub const MAX_VERBOSITY: u8 = 3;

/// How changes turn into command runs. Fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunPolicy {
    /// Treat every directory target as a whole subtree.
    pub recursive: bool,
    /// Skip changes whose file was last modified before the last run started.
    pub run_once: bool,
    /// Run once at startup before any change is observed.
    pub run_at_start: bool,
    /// Terminate a still-running command instead of waiting for it.
    pub kill_and_replace: bool,
    /// 0..=3, see [`crate::report`].
    pub verbosity: u8,
}

/// Fully validated invocation.
///
/// Built from [`CliArgs`](crate::cli::CliArgs) via `TryFrom`, which is the
/// only way to obtain one outside this crate's tests.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Watch targets as typed by the user.
    pub targets: Vec<String>,
    /// Command template; `%f` is substituted per run.
    pub command: Vec<String>,
    pub policy: RunPolicy,
    pub log_level: Option<LogLevel>,
}

impl Settings {
    pub(crate) fn new_unchecked(
        targets: Vec<String>,
        command: Vec<String>,
        policy: RunPolicy,
        log_level: Option<LogLevel>,
    ) -> Self {
        Self {
            targets,
            command,
            policy,
            log_level,
        }
    }

    /// Human-readable description of what is being watched.
    pub fn describe(&self) -> String {
        let quoted: Vec<String> = self.targets.iter().map(|t| format!("'{t}'")).collect();
        let files = match quoted.split_last() {
            Some((last, [])) => last.clone(),
            Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
            None => String::new(),
        };
        format!("When {} changes, run '{}'", files, self.command.join(" "))
    }
}
