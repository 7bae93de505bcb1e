// src/engine/mod.rs

//! Dispatch engine for when-changed.
//!
//! This module ties together:
//! - the debouncer
//! - the run policy (run-once, run-at-start, kill-and-replace)
//! - the main runtime event loop that reacts to:
//!   - file-watch events
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::types::RawEvent;

/// Events flowing into the runtime from the watcher and the signal handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// The watch source observed a change.
    FileChanged(RawEvent),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod debounce;
pub mod event_handlers;
pub mod runtime;

pub use self::core::CoreDispatcher;
pub use debounce::{Debouncer, DEBOUNCE_WINDOW};
pub use event_handlers::{CoreCommand, CoreStep, DispatchPhase, RunState, Verdict};
pub use runtime::Runtime;
