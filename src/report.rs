// src/report.rs

//! User-facing announcements printed before each run (`-v`, `-vv`, `-vvv`).

use chrono::{DateTime, Local};

use crate::types::LogicalChange;

#[derive(Debug, Clone, Default)]
pub struct Reporter {
    verbosity: u8,
    command_line: String,
}

impl Reporter {
    pub fn new(verbosity: u8, command: &[String]) -> Self {
        Self {
            verbosity,
            command_line: command.join(" "),
        }
    }

    /// Reporter that never prints.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Line announcing `change`, or `None` at verbosity 0.
    ///
    /// - 1: `==> 'path' modified <==`
    /// - 2: adds ` at YYYY-MM-DD HH:MM:SS`
    /// - 3: adds microseconds and `, running <command>`
    pub fn format(&self, change: &LogicalChange) -> Option<String> {
        let head = format!("==> '{}' {}", change.path_str(), change.kind.verb());
        let at: DateTime<Local> = change.timestamp.into();

        let line = match self.verbosity {
            0 => return None,
            1 => format!("{head} <=="),
            2 => format!("{head} at {} <==", at.format("%F %T")),
            _ => format!(
                "{head} at {}, running {} <==",
                at.format("%F %T%.6f"),
                self.command_line
            ),
        };
        Some(line)
    }

    pub fn announce(&self, change: &LogicalChange) {
        if let Some(line) = self.format(change) {
            println!("{line}");
        }
    }
}
