// src/config/validate.rs

use crate::cli::CliArgs;
use crate::config::model::{RunPolicy, Settings, MAX_VERBOSITY};
use crate::errors::{Result, WhenChangedError};

impl TryFrom<CliArgs> for Settings {
    type Error = WhenChangedError;

    fn try_from(args: CliArgs) -> std::result::Result<Self, Self::Error> {
        let (targets, command) = split_targets_and_command(args.args, args.command)?;

        let policy = RunPolicy {
            recursive: args.recursive,
            run_once: args.run_once,
            run_at_start: args.run_at_start,
            kill_and_replace: args.kill,
            verbosity: args.verbose.min(MAX_VERBOSITY),
        };

        Ok(Settings::new_unchecked(targets, command, policy, args.log_level))
    }
}

/// Apply the two invocation forms.
///
/// - With `-c`: every positional is a FILE, the split-off tail is the command.
/// - Without: the first positional is the only FILE, the rest is the command.
fn split_targets_and_command(
    positional: Vec<String>,
    command: Option<Vec<String>>,
) -> Result<(Vec<String>, Vec<String>)> {
    let (targets, command) = match command {
        Some(command) => (positional, command),
        None => {
            let mut rest = positional.into_iter();
            let targets: Vec<String> = rest.next().into_iter().collect();
            (targets, rest.collect())
        }
    };

    if targets.is_empty() {
        return Err(WhenChangedError::ArgumentError(
            "at least one FILE to watch is required".to_string(),
        ));
    }
    if command.is_empty() {
        return Err(WhenChangedError::ArgumentError(
            "a COMMAND to run is required".to_string(),
        ));
    }

    Ok((targets, command))
}
