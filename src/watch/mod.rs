// src/watch/mod.rs

//! File watching and change classification.
//!
//! This module is responsible for:
//! - Resolving the user's watch targets and answering interest queries
//!   ([`path_index`]).
//! - The fixed editor/VCS exclusion rules ([`exclusion`]).
//! - Wiring up a cross-platform filesystem watcher (`notify`) and turning its
//!   events into [`RawEvent`](crate::types::RawEvent)s ([`watcher`]).
//!
//! It does **not** decide whether a command runs; that is the engine's job.

pub mod exclusion;
pub mod path_index;
pub mod watcher;

pub use exclusion::ExclusionFilter;
pub use path_index::{PathIndex, WatchTarget};
pub use watcher::{spawn_watcher, translate_event, WatcherHandle, CREATION_FOLDED};
