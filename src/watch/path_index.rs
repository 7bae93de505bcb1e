// src/watch/path_index.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use notify::RecursiveMode;
use tracing::debug;

use crate::errors::{Result, WhenChangedError};
use crate::fs::FileSystem;

/// A file or directory the user asked to watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    canonical: PathBuf,
    spelling: String,
    is_dir: bool,
}

impl WatchTarget {
    /// Canonical absolute path (symlinks resolved).
    pub fn path(&self) -> &Path {
        &self.canonical
    }

    /// The path as the user typed it.
    pub fn spelling(&self) -> &str {
        &self.spelling
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }
}

/// Immutable set of watch targets keyed by canonical path.
///
/// Answers "does this event path belong to something we watch?" and which
/// directories the watch source has to subscribe to.
#[derive(Debug, Clone, Default)]
pub struct PathIndex {
    targets: BTreeMap<PathBuf, WatchTarget>,
}

impl PathIndex {
    /// Resolve the user-supplied targets.
    ///
    /// Every target must exist; the first one that cannot be canonicalized is
    /// reported as [`WhenChangedError::InvalidTarget`]. Targets that resolve to
    /// the same canonical path collapse into one entry (first spelling wins).
    pub fn resolve<S: AsRef<str>>(fs: &dyn FileSystem, targets: &[S]) -> Result<Self> {
        let mut index = BTreeMap::new();

        for target in targets {
            let spelling = target.as_ref();
            let canonical = fs.canonicalize(Path::new(spelling)).map_err(|err| {
                WhenChangedError::InvalidTarget {
                    target: spelling.to_string(),
                    reason: format!("{err:#}"),
                }
            })?;
            let is_dir = fs.is_dir(&canonical);

            debug!(target = %spelling, canonical = ?canonical, is_dir, "resolved watch target");

            index.entry(canonical.clone()).or_insert(WatchTarget {
                canonical,
                spelling: spelling.to_string(),
                is_dir,
            });
        }

        Ok(Self { targets: index })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn get(&self, path: &Path) -> Option<&WatchTarget> {
        self.targets.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.targets.contains_key(path)
    }

    /// Whether a change at `path` concerns one of the targets.
    ///
    /// True for the target itself and for direct children of a directory
    /// target. With `recursive`, any ancestor below the filesystem root also
    /// counts.
    pub fn is_interested(&self, path: &Path, recursive: bool) -> bool {
        if self.contains(path) {
            return true;
        }

        let Some(parent) = path.parent() else {
            return false;
        };
        if self.contains(parent) {
            return true;
        }
        if !recursive {
            return false;
        }

        // `ancestors()` ends at the root, whose parent is `None`.
        parent
            .ancestors()
            .skip(1)
            .take_while(|dir| dir.parent().is_some_and(|up| up != *dir))
            .any(|dir| self.contains(dir))
    }

    /// Directories the watch source must subscribe to.
    ///
    /// Directory targets are watched themselves; file targets through their
    /// parent, so a save that replaces the file by rename is still seen.
    pub fn watch_roots(&self, recursive: bool) -> Vec<(PathBuf, RecursiveMode)> {
        let mut roots: BTreeMap<PathBuf, RecursiveMode> = BTreeMap::new();

        for target in self.targets.values() {
            let (dir, mode) = if target.is_dir {
                let mode = if recursive {
                    RecursiveMode::Recursive
                } else {
                    RecursiveMode::NonRecursive
                };
                (target.canonical.clone(), mode)
            } else {
                let dir = target
                    .canonical
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| target.canonical.clone());
                (dir, RecursiveMode::NonRecursive)
            };

            roots
                .entry(dir)
                .and_modify(|existing| {
                    if mode == RecursiveMode::Recursive {
                        *existing = RecursiveMode::Recursive;
                    }
                })
                .or_insert(mode);
        }

        roots.into_iter().collect()
    }
}
