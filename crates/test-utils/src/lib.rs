//! Shared helpers for the when-changed integration tests.

pub mod builders;
pub mod fake_executor;

use std::path::PathBuf;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};
use when_changed::engine::RuntimeEvent;
use when_changed::types::{EventKind, RawEvent};

static INIT: Once = Once::new();

/// Longest any single test future may take before it is treated as hung.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Install a test-writer subscriber once per test binary.
///
/// Without `RUST_LOG` only the crate's own `info` lines are shown, and only
/// for failing tests; `RUST_LOG=when_changed=trace` shows every dispatch
/// decision.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("when_changed=info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, failing the test once [`TEST_TIMEOUT`] passes.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .expect("test future did not finish within TEST_TIMEOUT")
}

/// Runtime event for a change to the file `path`.
pub fn file_event(path: &str, kind: EventKind) -> RuntimeEvent {
    RuntimeEvent::FileChanged(RawEvent::new(PathBuf::from(path), kind))
}

/// Runtime event for a change to the directory `path`.
pub fn dir_event(path: &str, kind: EventKind) -> RuntimeEvent {
    RuntimeEvent::FileChanged(RawEvent::directory(PathBuf::from(path), kind))
}
