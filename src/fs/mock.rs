use super::FileSystem;
use anyhow::{anyhow, bail, Result};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

/// Symlink chains longer than this are treated as loops.
const MAX_SYMLINK_HOPS: usize = 40;

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { modified: SystemTime },
    Dir,
    Symlink(PathBuf),
}

/// In-memory filesystem keyed by absolute path.
///
/// Parent directories are created implicitly. Symlinks are resolved
/// component by component, like the real `canonicalize`.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let fs = Self::default();
        fs.lock().insert(PathBuf::from("/"), MockEntry::Dir);
        fs
    }

    pub fn add_file(&self, path: impl AsRef<Path>, modified: SystemTime) {
        self.insert(path.as_ref(), MockEntry::File { modified });
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Dir);
    }

    pub fn add_symlink(&self, link: impl AsRef<Path>, target: impl Into<PathBuf>) {
        self.insert(link.as_ref(), MockEntry::Symlink(target.into()));
    }

    /// Update the modification time of an existing file.
    pub fn touch(&self, path: impl AsRef<Path>, modified: SystemTime) {
        self.add_file(path, modified);
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        self.lock().remove(path.as_ref());
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut entries = self.lock();
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            entries
                .entry(ancestor.to_path_buf())
                .or_insert(MockEntry::Dir);
        }
        entries.insert(path.to_path_buf(), entry);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, MockEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Resolve symlinks in every component of an absolute path.
    fn resolve(&self, path: &Path) -> Result<PathBuf> {
        if !path.is_absolute() {
            bail!("mock filesystem only knows absolute paths: {:?}", path);
        }

        let entries = self.lock();
        let mut resolved = PathBuf::from("/");
        let mut hops = 0;

        for component in path.components() {
            match component {
                Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(name) => {
                    resolved.push(name);
                    while let Some(MockEntry::Symlink(target)) = entries.get(&resolved) {
                        hops += 1;
                        if hops > MAX_SYMLINK_HOPS {
                            bail!("too many levels of symbolic links: {:?}", path);
                        }
                        resolved = if target.is_absolute() {
                            target.clone()
                        } else {
                            let mut base = resolved.clone();
                            base.pop();
                            base.join(target)
                        };
                    }
                    if !entries.contains_key(&resolved) {
                        return Err(anyhow!("No such file or directory: {:?}", path));
                    }
                }
            }
        }

        Ok(resolved)
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        match self.resolve(path) {
            Ok(real) => matches!(self.lock().get(&real), Some(MockEntry::Dir)),
            Err(_) => false,
        }
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        self.resolve(path)
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        let real = self.resolve(path)?;
        match self.lock().get(&real) {
            Some(MockEntry::File { modified }) => Ok(*modified),
            Some(_) => Err(anyhow!("Not a regular file: {:?}", path)),
            None => Err(anyhow!("No such file or directory: {:?}", path)),
        }
    }
}
