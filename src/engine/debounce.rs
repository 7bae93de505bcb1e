// src/engine/debounce.rs

//! Coalescing of rapid repeat notifications.
//!
//! Editors commonly issue several writes and renames for one save. Events for
//! the path that fired last are swallowed until the window has passed; an
//! event for any other path always fires.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::types::EventKind;

/// Repeat events for the same path closer together than this are dropped.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    last_fire: Option<(PathBuf, SystemTime)>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW)
    }
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_fire: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Path of the most recent event that fired.
    pub fn last_path(&self) -> Option<&Path> {
        self.last_fire.as_ref().map(|(path, _)| path.as_path())
    }

    /// Decide whether an event starts a new logical change.
    ///
    /// State is only updated when the event fires, so a steady stream of
    /// events for one path fires at most once per window.
    pub fn should_fire(&mut self, path: &Path, _kind: EventKind, now: SystemTime) -> bool {
        let fire = match &self.last_fire {
            None => true,
            Some((last_path, _)) if last_path != path => true,
            Some((_, last_time)) => match now.duration_since(*last_time) {
                Ok(elapsed) => elapsed > self.window,
                // Clock went backwards; don't let that mute the path.
                Err(_) => true,
            },
        };

        if fire {
            self.last_fire = Some((path.to_path_buf(), now));
        }
        fire
    }
}
