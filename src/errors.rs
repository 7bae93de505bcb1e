// src/errors.rs

//! Crate-wide error type and exit-code mapping.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WhenChangedError {
    #[error("cannot watch '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("failed to start command `{command}`: {source}")]
    SpawnFailure {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("lost track of command `{command}`: {source}")]
    WaitFailure {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot stat {path:?}: {reason}")]
    StatFailure { path: PathBuf, reason: String },

    #[error("{0}")]
    ArgumentError(String),

    #[error("watched directory {0:?} disappeared")]
    WatchLost(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("file watcher error: {0}")]
    Notify(#[from] notify::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WhenChangedError {
    /// Errors that are isolated to a single event and must not stop the loop.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WhenChangedError::SpawnFailure { .. }
                | WhenChangedError::WaitFailure { .. }
                | WhenChangedError::StatFailure { .. }
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WhenChangedError>;
