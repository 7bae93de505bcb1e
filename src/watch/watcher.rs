// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use notify::event::{AccessKind, AccessMode, CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Config, Event, RecommendedWatcher, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::RuntimeEvent;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::types::{EventKind, RawEvent};
use crate::watch::path_index::PathIndex;

/// Whether the platform's notify backend reports a modification right after
/// every creation, making `Created` a duplicate.
///
/// inotify does: a new file is followed by `IN_ATTRIB` / `IN_CLOSE_WRITE`.
pub const CREATION_FOLDED: bool = cfg!(target_os = "linux");

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    roots: Vec<PathBuf>,
}

impl WatcherHandle {
    /// Directories the OS watcher is subscribed to.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

/// Subscribe to every watch root of `index` and forward translated
/// [`RawEvent`]s to the runtime as `RuntimeEvent::FileChanged`.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_watcher(
    index: &PathIndex,
    recursive: bool,
    fs: Arc<dyn FileSystem>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    warn!("failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                warn!("file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    let mut roots = Vec::new();
    for (root, mode) in index.watch_roots(recursive) {
        watcher.watch(&root, mode)?;
        info!(root = ?root, ?mode, "watching");
        roots.push(root);
    }

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!(?event, "received notify event");

            for raw in translate_event(&event, fs.as_ref()) {
                if runtime_tx.send(RuntimeEvent::FileChanged(raw)).await.is_err() {
                    // The runtime is gone; nothing left to deliver to.
                    debug!("runtime channel closed; stopping watcher loop");
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle {
        _inner: watcher,
        roots,
    })
}

/// Map a `notify` event onto zero or more [`RawEvent`]s.
///
/// Renames report the destination path; the source side of a rename is
/// dropped. Pure reads and unrecognised kinds produce nothing.
pub fn translate_event(event: &Event, fs: &dyn FileSystem) -> Vec<RawEvent> {
    use notify::EventKind as Kind;

    let classify = |path: &PathBuf, kind: EventKind| RawEvent {
        path: path.clone(),
        kind,
        is_directory: fs.is_dir(path),
    };

    match event.kind {
        Kind::Create(CreateKind::Folder) => event
            .paths
            .iter()
            .map(|p| RawEvent::directory(p.clone(), EventKind::Created))
            .collect(),
        Kind::Create(_) => event
            .paths
            .iter()
            .map(|p| classify(p, EventKind::Created))
            .collect(),

        Kind::Modify(ModifyKind::Name(RenameMode::Both)) => event
            .paths
            .get(1)
            .map(|dest| vec![classify(dest, EventKind::MovedTo)])
            .unwrap_or_default(),
        Kind::Modify(ModifyKind::Name(RenameMode::To)) => event
            .paths
            .iter()
            .map(|p| classify(p, EventKind::MovedTo))
            .collect(),
        Kind::Modify(ModifyKind::Name(RenameMode::From)) => Vec::new(),
        // Backends that cannot tell the two sides apart: whatever still
        // exists was the destination.
        Kind::Modify(ModifyKind::Name(_)) => event
            .paths
            .iter()
            .map(|p| {
                if fs.exists(p) {
                    classify(p, EventKind::MovedTo)
                } else {
                    RawEvent::new(p.clone(), EventKind::Deleted)
                }
            })
            .collect(),
        Kind::Modify(_) | Kind::Access(AccessKind::Close(AccessMode::Write)) => event
            .paths
            .iter()
            .map(|p| classify(p, EventKind::Modified))
            .collect(),

        Kind::Remove(RemoveKind::Folder) => event
            .paths
            .iter()
            .map(|p| RawEvent::directory(p.clone(), EventKind::Deleted))
            .collect(),
        Kind::Remove(_) => event
            .paths
            .iter()
            .map(|p| RawEvent::new(p.clone(), EventKind::Deleted))
            .collect(),

        Kind::Access(_) | Kind::Any | Kind::Other => Vec::new(),
    }
}
