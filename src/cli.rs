// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Two invocation forms are accepted:
//!
//! ```text
//! when-changed [OPTIONS] FILE COMMAND...
//! when-changed [OPTIONS] FILE... -c COMMAND...
//! ```
//!
//! The first bare `-c` or `--command` ends the FILE list and everything after
//! it is the command. Only when neither is present does an argument with the
//! command attached (as in `-ctrue`) play that role. The command is split off
//! before clap sees the rest, so command arguments that look like flags are
//! never interpreted.

use std::ffi::OsString;

use clap::{ArgAction, Parser, ValueEnum};

const USAGE: &str = "when-changed [OPTIONS] FILE COMMAND...\n       \
                     when-changed [OPTIONS] FILE... -c COMMAND...";

/// Command-line arguments for `when-changed`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "when-changed",
    version,
    about = "Run a command when a file is changed.",
    long_about = "Run a command when a file is changed.\n\n\
                  `%f` in the command is replaced with the changed file. The \
                  command also sees WHEN_CHANGED_EVENT and WHEN_CHANGED_FILE \
                  in its environment.\n\n\
                  A command with arguments starting with `-c` (like \
                  `gcc -c` or `java -cp`) must be given after a separate \
                  `-c`: `when-changed FILE -c gcc -c FILE`.",
    override_usage = USAGE
)]
pub struct CliArgs {
    /// Watch directories recursively.
    #[arg(short = 'r', long)]
    pub recursive: bool,

    /// Announce each change (repeat up to 3 times for timestamps and the command).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Don't re-run the command for changes made before it last started.
    #[arg(short = '1', long = "run-once")]
    pub run_once: bool,

    /// Run the command once immediately at start.
    #[arg(short = 's', long = "run-at-start")]
    pub run_at_start: bool,

    /// Kill a still-running command before starting it again.
    #[arg(short = 'k', long = "kill")]
    pub kill: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WHEN_CHANGED_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// FILE, then COMMAND... (or FILE... when `-c` is used).
    #[arg(value_name = "FILE", required = true, num_args = 1.., trailing_var_arg = true)]
    pub args: Vec<String>,

    /// Everything after `-c` / `--command`, if present.
    #[arg(skip)]
    pub command: Option<Vec<String>>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl CliArgs {
    /// Parse from an explicit argv (program name first), applying the `-c`
    /// split.
    pub fn try_parse_args<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
        let (head, command) = split_command(argv);

        let mut args = CliArgs::try_parse_from(head)?;
        args.command = command;
        Ok(args)
    }
}

/// Split argv at the command flag.
///
/// Returns the part clap should parse and, if the flag was present, the
/// command that follows it.
fn split_command(argv: Vec<OsString>) -> (Vec<OsString>, Option<Vec<String>>) {
    let is_bare = |arg: &OsString| arg == "-c" || arg == "--command";
    let is_attached = |arg: &OsString| arg.to_str().is_some_and(|s| s.starts_with("-c"));

    let position = argv
        .iter()
        .skip(1)
        .position(is_bare)
        .or_else(|| argv.iter().skip(1).position(is_attached));

    let Some(offset) = position else {
        return (argv, None);
    };

    let mut head = argv;
    let mut tail = head.split_off(offset + 1);
    let flag = tail.remove(0);

    let mut command = Vec::with_capacity(tail.len() + 1);
    if let Some(attached) = flag.to_str().and_then(|s| s.strip_prefix("-c")) {
        if !attached.is_empty() {
            command.push(attached.to_string());
        }
    }
    command.extend(tail.into_iter().map(|arg| arg.to_string_lossy().into_owned()));

    (head, Some(command))
}

/// Parse the process arguments, exiting on parse errors or `--help`.
pub fn parse() -> CliArgs {
    match CliArgs::try_parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(err) => err.exit(),
    }
}

/// The usage synopsis, for errors clap does not report itself.
pub fn usage() -> String {
    format!("Usage: {USAGE}")
}
