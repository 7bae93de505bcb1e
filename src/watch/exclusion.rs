// src/watch/exclusion.rs

use std::fmt;
use std::path::{Component, Path};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Basename patterns for editor artifacts:
/// - vim swap files (`.name.swp`, `.swo`, `.swn`)
/// - vim's write-permission check file `4913`
/// - backup files ending in `~`
pub const EXCLUDED_BASENAMES: &[&str] = &[".*.sw[pon]", "4913", "*~"];

/// Directory names excluded together with everything below them.
pub const EXCLUDED_SEGMENTS: &[&str] = &[".git", "__pycache__"];

/// Fixed exclusion rules applied to every event before interest checks.
#[derive(Clone)]
pub struct ExclusionFilter {
    basenames: GlobSet,
    segments: GlobSet,
}

impl fmt::Debug for ExclusionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExclusionFilter")
            .field("basenames", &EXCLUDED_BASENAMES)
            .field("segments", &EXCLUDED_SEGMENTS)
            .finish()
    }
}

impl ExclusionFilter {
    /// Compile the built-in rules.
    pub fn new() -> Result<Self> {
        Ok(Self {
            basenames: build_globset(EXCLUDED_BASENAMES)
                .context("building basename exclusion globset")?,
            segments: build_globset(EXCLUDED_SEGMENTS)
                .context("building directory exclusion globset")?,
        })
    }

    /// True if `path` is an editor/VCS/cache artifact that must never
    /// trigger the command.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let basename_hit = path
            .file_name()
            .is_some_and(|name| self.basenames.is_match(Path::new(name)));
        if basename_hit {
            return true;
        }

        path.components().any(|component| match component {
            Component::Normal(segment) => self.segments.is_match(Path::new(segment)),
            _ => false,
        })
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
