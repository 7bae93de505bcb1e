use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

/// Path handed to the command for the synthetic run at startup.
pub const START_SENTINEL: &str = "/dev/null";

/// Kind of filesystem change, as reported by the watch source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Created,
    Modified,
    MovedTo,
    Deleted,
}

impl EventKind {
    /// Value exported to the command as `WHEN_CHANGED_EVENT`.
    pub fn env_value(self) -> &'static str {
        match self {
            EventKind::Created => "file_created",
            EventKind::Modified => "file_modified",
            EventKind::MovedTo => "file_moved",
            EventKind::Deleted => "file_deleted",
        }
    }

    /// Past-tense verb used in verbose announcements.
    pub fn verb(self) -> &'static str {
        match self {
            EventKind::Created => "created",
            EventKind::Modified => "modified",
            EventKind::MovedTo => "moved",
            EventKind::Deleted => "deleted",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.env_value())
    }
}

/// A single, unfiltered change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub path: PathBuf,
    pub kind: EventKind,
    pub is_directory: bool,
}

impl RawEvent {
    pub fn new(path: impl Into<PathBuf>, kind: EventKind) -> Self {
        Self {
            path: path.into(),
            kind,
            is_directory: false,
        }
    }

    pub fn directory(path: impl Into<PathBuf>, kind: EventKind) -> Self {
        Self {
            path: path.into(),
            kind,
            is_directory: true,
        }
    }
}

/// A change that survived filtering and debouncing and will run the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalChange {
    pub path: PathBuf,
    pub kind: EventKind,
    pub timestamp: SystemTime,
}

impl LogicalChange {
    /// The synthetic change used for `--run-at-start`.
    pub fn at_start(timestamp: SystemTime) -> Self {
        Self {
            path: PathBuf::from(START_SENTINEL),
            kind: EventKind::Modified,
            timestamp,
        }
    }

    /// Path as substituted into the command and exported as `WHEN_CHANGED_FILE`.
    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}
