#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use when_changed::config::RunPolicy;
use when_changed::engine::CoreDispatcher;
use when_changed::fs::mock::MockFileSystem;
use when_changed::fs::FileSystem;
use when_changed::watch::{ExclusionFilter, PathIndex};

/// Fixed reference instant so tests don't depend on the wall clock.
pub fn t0() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

/// `t0()` plus `ms` milliseconds.
pub fn at(ms: u64) -> SystemTime {
    t0() + Duration::from_millis(ms)
}

/// Builder for `RunPolicy`.
#[derive(Debug, Default)]
pub struct RunPolicyBuilder {
    policy: RunPolicy,
}

impl RunPolicyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recursive(mut self, val: bool) -> Self {
        self.policy.recursive = val;
        self
    }

    pub fn run_once(mut self, val: bool) -> Self {
        self.policy.run_once = val;
        self
    }

    pub fn run_at_start(mut self, val: bool) -> Self {
        self.policy.run_at_start = val;
        self
    }

    pub fn kill_and_replace(mut self, val: bool) -> Self {
        self.policy.kill_and_replace = val;
        self
    }

    pub fn verbosity(mut self, val: u8) -> Self {
        self.policy.verbosity = val;
        self
    }

    pub fn build(self) -> RunPolicy {
        self.policy
    }
}

/// Builder for a `CoreDispatcher` backed by a `MockFileSystem`.
///
/// Files and directories are added to the mock first; `build` then resolves
/// the targets against it.
pub struct DispatcherBuilder {
    fs: MockFileSystem,
    targets: Vec<String>,
    policy: RunPolicy,
    creation_folded: bool,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            fs: MockFileSystem::new(),
            targets: Vec::new(),
            policy: RunPolicy::default(),
            creation_folded: false,
        }
    }

    /// Add a file with modification time `t0()`.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.fs.add_file(path, t0());
        self
    }

    pub fn with_dir(self, path: impl AsRef<Path>) -> Self {
        self.fs.add_dir(path);
        self
    }

    pub fn watch(mut self, target: &str) -> Self {
        self.targets.push(target.to_string());
        self
    }

    pub fn policy(mut self, policy: RunPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn creation_folded(mut self, val: bool) -> Self {
        self.creation_folded = val;
        self
    }

    /// Handle on the mock, for mutating it after `build`.
    pub fn fs(&self) -> MockFileSystem {
        self.fs.clone()
    }

    pub fn build(self) -> CoreDispatcher {
        let index = PathIndex::resolve(&self.fs, self.targets.as_slice())
            .expect("Failed to resolve targets against mock filesystem");
        let exclusions = ExclusionFilter::new().expect("Failed to build exclusion filter");
        let fs: Arc<dyn FileSystem> = Arc::new(self.fs);
        CoreDispatcher::new(index, exclusions, self.policy, fs)
            .with_creation_folded(self.creation_folded)
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
